/*
 * The static-HTML export pipeline. The editor renders pages itself; this module only
 * materialises files under `<workspace>/build`: the combined stylesheet, library
 * assets, per-page HTML and the images each page refers to.
 *
 * Export works on local paths only. The router checks `PlatformAdapter::local_path`
 * for the workspace root before calling in here.
 */
use crate::core::checksum_utils::url_file_stem;
use crate::core::path_utils::{export_html_path, resolve_in_workspace};
use crate::core::resource_map::{EXPORT_CSS_FRAGMENTS, ResourceMap, normalize_virtual_path};
use crate::core::workspace_tree::EXPORT_DIR_NAME;
use crate::platform_layer::codec::{LOCAL_FILE_PREFIX, strip_utf8_bom};
use crate::platform_layer::{PlatformAdapter, PlatformError, PlatformResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const STYLESHEET_NAME: &str = "style.css";
const IMAGE_DIR_NAME: &str = "src";
const DEFAULT_IMAGE_EXTENSION: &str = ".png";

// Missing fields read as empty; such a task is skipped when it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageExportTask {
    pub original_src: String,
    pub page_path: String,
}

/*
 * Reads each element of a `tasks` array on its own, so one unreadable entry only
 * drops that entry.
 */
pub fn parse_image_tasks(items: &[Value]) -> Vec<ImageExportTask> {
    items
        .iter()
        .filter_map(|item| match ImageExportTask::deserialize(item) {
            Ok(task) => Some(task),
            Err(e) => {
                log::warn!("Export: Skipping unreadable image task {item}: {e}");
                None
            }
        })
        .collect()
}

pub fn export_dir(root: &Path) -> PathBuf {
    root.join(EXPORT_DIR_NAME)
}

/*
 * Writes the bundled resource at `virtual_path` to `destination`, creating parent
 * folders. Returns false, without touching the disk, when the path is not in the
 * resource table or the host cannot load it.
 */
pub fn extract_resource_to_file(
    adapter: &dyn PlatformAdapter,
    resources: &ResourceMap,
    virtual_path: &str,
    destination: &Path,
) -> bool {
    let Some(handle) = resources.lookup(virtual_path) else {
        log::warn!("Export: '{virtual_path}' is not a bundled resource.");
        return false;
    };
    let Some(bytes) = adapter.load_resource_data(handle) else {
        log::warn!("Export: Host could not load resource '{virtual_path}'.");
        return false;
    };
    let written = destination
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| fs::write(destination, &bytes));
    match written {
        Ok(()) => true,
        Err(e) => {
            log::error!("Export: Writing {destination:?} failed: {e}");
            false
        }
    }
}

/*
 * Recreates the export folder, writes `style.css` from the bundled fragments and
 * extracts every requested library. Fragments the host lacks are skipped; a library
 * that cannot be extracted fails the whole step.
 */
pub fn prepare_export_libs(
    adapter: &dyn PlatformAdapter,
    resources: &ResourceMap,
    root: &Path,
    library_paths: &[String],
) -> PlatformResult<()> {
    let build = export_dir(root);
    if build.exists() {
        fs::remove_dir_all(&build)?;
    }
    fs::create_dir_all(&build)?;

    let mut stylesheet = fs::File::create(build.join(STYLESHEET_NAME))?;
    for fragment in EXPORT_CSS_FRAGMENTS {
        let Some(bytes) = resources
            .lookup(fragment)
            .and_then(|handle| adapter.load_resource_data(handle))
        else {
            log::debug!("Export: Stylesheet fragment '{fragment}' unavailable, skipped.");
            continue;
        };
        stylesheet.write_all(strip_utf8_bom(&bytes))?;
        stylesheet.write_all(b"\n\n")?;
    }
    stylesheet.flush()?;

    for library in library_paths {
        let virtual_path = normalize_virtual_path(library);
        let destination = build.join(virtual_path.trim_start_matches('/'));
        if !extract_resource_to_file(adapter, resources, &virtual_path, &destination) {
            return Err(PlatformError::NotFound(format!(
                "Failed to extract library: {library}"
            )));
        }
    }
    Ok(())
}

pub fn write_page_html(root: &Path, page_path: &str, html: &str) -> PlatformResult<PathBuf> {
    let page = resolve_in_workspace(root, page_path);
    let target = export_html_path(root, &export_dir(root), &page);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, html)?;
    Ok(target)
}

pub fn remove_export_dir(root: &Path) -> PlatformResult<()> {
    let build = export_dir(root);
    if build.exists() {
        fs::remove_dir_all(&build)?;
    }
    Ok(())
}

// `.ext` of the last path segment of `url`, ignoring query and fragment.
fn url_extension(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let after_scheme = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);
    let last_segment = match after_scheme.split_once('/') {
        Some((_, path)) => path.rsplit('/').next().unwrap_or_default(),
        None => "",
    };
    match Path::new(last_segment).extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy()),
        _ => DEFAULT_IMAGE_EXTENSION.to_string(),
    }
}

/*
 * Runs one image task and returns the path the exported page should use for it,
 * or `None` when the task is skipped.
 */
fn export_one_image(
    adapter: &dyn PlatformAdapter,
    root: &Path,
    task: &ImageExportTask,
    on_progress: &mut dyn FnMut(&str, u8),
) -> Option<String> {
    let page = resolve_in_workspace(root, &task.page_path);
    let html_target = export_html_path(root, &export_dir(root), &page);
    let image_dir = html_target.parent()?.join(IMAGE_DIR_NAME);
    if let Err(e) = fs::create_dir_all(&image_dir) {
        log::error!("Export: Cannot create {image_dir:?}: {e}");
        return None;
    }

    let src = task.original_src.as_str();
    let source_path = if let Some(encoded) = src.strip_prefix(LOCAL_FILE_PREFIX) {
        match adapter.url_decode(encoded) {
            Some(decoded) => PathBuf::from(decoded),
            None => {
                log::warn!("Export: Cannot decode local image marker '{src}', skipped.");
                return None;
            }
        }
    } else if src.starts_with("http") {
        let file_name = format!("{}{}", url_file_stem(src), url_extension(src));
        let destination = image_dir.join(&file_name);
        let mut report = |percent: u8| on_progress(src, percent);
        return match adapter.download_file(src, &destination, &mut report) {
            Ok(()) => Some(format!("{IMAGE_DIR_NAME}/{file_name}")),
            Err(e) => {
                log::warn!("Export: Download of '{src}' failed, skipped: {e}");
                None
            }
        };
    } else {
        resolve_in_workspace(root, src)
    };

    if !source_path.is_file() {
        log::warn!("Export: Image {source_path:?} does not exist, skipped.");
        return None;
    }
    let file_name = source_path.file_name()?.to_string_lossy().into_owned();
    match fs::copy(&source_path, image_dir.join(&file_name)) {
        Ok(_) => Some(format!("{IMAGE_DIR_NAME}/{file_name}")),
        Err(e) => {
            log::warn!("Export: Copying {source_path:?} failed, skipped: {e}");
            None
        }
    }
}

/*
 * Copies or downloads the image behind every task into the `src/` folder next to
 * its page's HTML and maps each original source to its new relative path. Failed
 * tasks are left out of the map. `should_stop` is checked before each task and
 * makes the run return `None`.
 */
pub fn process_export_images(
    adapter: &dyn PlatformAdapter,
    root: &Path,
    tasks: &[ImageExportTask],
    should_stop: &dyn Fn() -> bool,
    on_progress: &mut dyn FnMut(&str, u8),
) -> Option<Map<String, Value>> {
    let mut src_map = Map::new();
    for task in tasks {
        if should_stop() {
            log::info!("Export: Image processing cancelled.");
            return None;
        }
        if task.original_src.is_empty() || task.page_path.is_empty() {
            log::warn!("Export: Image task {task:?} lacks a source or page, skipped.");
            continue;
        }
        if let Some(new_path) = export_one_image(adapter, root, task, on_progress) {
            src_map.insert(task.original_src.clone(), Value::from(new_path));
        }
    }
    Some(src_map)
}
