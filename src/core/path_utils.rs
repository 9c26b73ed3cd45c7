/*
 * Path helpers shared by the desktop side of the backend: the application's
 * configuration directory, and the mapping between workspace files and their
 * counterparts in the export output.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::{Component, Path, PathBuf};

/*
 * Retrieves the application's local (non-roaming) configuration directory,
 * creating it if necessary.
 *
 * Returns `None` if `ProjectDirs` cannot find a home directory for the current
 * user or the directory cannot be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Attempting to get base app config local dir for '{app_name}'");
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        if !config_path.exists() {
            if let Err(e) = fs::create_dir_all(config_path) {
                log::error!(
                    "PathUtils: Failed to create base app config directory {config_path:?}: {e}"
                );
                return None;
            }
            log::debug!("PathUtils: Created base app config directory: {config_path:?}");
        }
        Some(config_path.to_path_buf())
    })
}

/*
 * `path` relative to `root`, with `/` separators, or `None` when `path` is not
 * inside `root`. The comparison is component-wise, so `/w2/x` is not inside `/w`.
 */
pub fn workspace_relative(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

// Relative identifiers are taken to be relative to the workspace root.
pub fn resolve_in_workspace(root: &Path, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    }
}

/*
 * Where the HTML rendering of `page` goes inside the export directory: the page's
 * path relative to the workspace root with its extension replaced by `.html`.
 * Pages outside the workspace are placed at the top of the export directory.
 */
pub fn export_html_path(root: &Path, export_dir: &Path, page: &Path) -> PathBuf {
    let relative = match page.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => page
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("page")),
    };
    export_dir.join(relative).with_extension("html")
}
