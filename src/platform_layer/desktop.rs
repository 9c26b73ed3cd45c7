/*
 * The desktop adapter. Identifiers are absolute filesystem paths and every
 * operation is performed directly and synchronously: completions run before the
 * adapter method returns. UI-facing capabilities are forwarded to a `WindowHost`
 * (`Win32Host` on Windows, `HeadlessHost` for the stdio host and tests).
 */
pub mod headless_host;
#[cfg(target_os = "windows")]
pub mod win32_host;
pub mod window_host;

pub use headless_host::HeadlessHost;
#[cfg(target_os = "windows")]
pub use win32_host::{WebViewChannel, Win32Host};
pub use window_host::WindowHost;

use crate::core::config_cascade::IdentifierTree;
use crate::core::page_document::to_pretty_json;
use crate::core::resource_map::ResourceHandle;
use crate::core::workspace_tree::EXPORT_DIR_NAME;
use crate::platform_layer::adapter::PlatformAdapter;
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use crate::platform_layer::types::{Completion, DirEntry, WindowState};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct DesktopAdapter {
    host: Box<dyn WindowHost>,
}

impl DesktopAdapter {
    pub fn new(host: Box<dyn WindowHost>) -> Self {
        DesktopAdapter { host }
    }

    pub fn host(&self) -> &dyn WindowHost {
        self.host.as_ref()
    }
}

fn path_to_identifier(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/*
 * Recursively lists `root`, skipping export output folders. Entries are gathered
 * with walkdir in file-name order and then reassembled into a tree from the leaves
 * up.
 */
fn scan_tree(root: &Path) -> PlatformResult<DirEntry> {
    if !root.is_dir() {
        return Err(PlatformError::NotFound(format!(
            "Workspace folder {root:?} does not exist."
        )));
    }

    let mut nodes: HashMap<PathBuf, DirEntry> = HashMap::new();
    let mut discovery_order: Vec<PathBuf> = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == EXPORT_DIR_NAME));

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("DesktopAdapter: Skipping unreadable entry during scan: {e}");
                continue;
            }
        };
        let path = entry.path().to_path_buf();
        let name = entry.file_name().to_string_lossy().into_owned();
        let identifier = path_to_identifier(&path);
        let node = if entry.file_type().is_dir() {
            DirEntry::directory(&name, &identifier, Vec::new())
        } else {
            DirEntry::file(&name, &identifier)
        };
        nodes.insert(path.clone(), node);
        discovery_order.push(path);
    }

    // Attach children to parents, deepest first, so each subtree is complete
    // before it is moved into its parent.
    let mut top_level: Vec<DirEntry> = Vec::new();
    for path in discovery_order.iter().rev() {
        let Some(node) = nodes.remove(path) else {
            continue;
        };
        match path.parent().filter(|p| *p != root) {
            Some(parent) => match nodes.get_mut(parent) {
                Some(parent_node) => parent_node.children.insert(0, node),
                None => {
                    log::error!("DesktopAdapter: Parent {parent:?} missing for {path:?}");
                }
            },
            None => top_level.insert(0, node),
        }
    }

    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_to_identifier(root));
    Ok(DirEntry::directory(
        &root_name,
        &path_to_identifier(root),
        top_level,
    ))
}

fn create_item_at(parent: &str, name: &str, is_directory: bool) -> PlatformResult<String> {
    let target = Path::new(parent).join(name);
    if target.exists() {
        return Err(PlatformError::AlreadyExists(format!(
            "{target:?} already exists."
        )));
    }
    if is_directory {
        fs::create_dir(&target)?;
    } else {
        fs::File::create_new(&target)?;
    }
    log::debug!("DesktopAdapter: Created {target:?}");
    Ok(path_to_identifier(&target))
}

fn delete_item_at(identifier: &str) -> PlatformResult<()> {
    let target = Path::new(identifier);
    if target.is_dir() {
        fs::remove_dir_all(target)?;
    } else if target.exists() {
        fs::remove_file(target)?;
    } else {
        log::debug!("DesktopAdapter: Nothing to delete at {target:?}");
    }
    Ok(())
}

fn list_subdirectories(root: &Path) -> PlatformResult<Vec<String>> {
    if !root.is_dir() {
        return Err(PlatformError::NotFound(format!("{root:?} is not a folder.")));
    }
    Ok(WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| path_to_identifier(e.path()))
        .collect())
}

impl IdentifierTree for DesktopAdapter {
    fn read_json_file(&self, identifier: &str) -> Value {
        let empty = || Value::Object(Map::new());
        match fs::read(identifier) {
            Ok(bytes) => serde_json::from_str(&self.decode_text(&bytes)).unwrap_or_else(|e| {
                log::debug!("DesktopAdapter: '{identifier}' is not valid JSON: {e}");
                empty()
            }),
            Err(_) => empty(),
        }
    }

    fn parent_identifier(&self, identifier: &str) -> String {
        Path::new(identifier)
            .parent()
            .map(path_to_identifier)
            .unwrap_or_default()
    }

    fn combine_identifier(&self, parent: &str, child_name: &str) -> String {
        path_to_identifier(&Path::new(parent).join(child_name))
    }
}

impl PlatformAdapter for DesktopAdapter {
    fn post_message(&self, message_json: &str) {
        self.host.post_message(message_json);
    }

    fn navigate_to(&self, url: &str) {
        log::debug!("DesktopAdapter: Navigating to {url}");
        self.host.navigate_to(url);
    }

    fn open_external_link(&self, url: &str) {
        self.host.open_external_link(url);
    }

    fn open_file_dialog(&self, done: Completion<Option<String>>) {
        done(
            self.host
                .pick_image_file()
                .map(|picked| picked.map(|p| path_to_identifier(&p))),
        );
    }

    fn open_workspace_dialog(&self, done: Completion<Option<String>>) {
        done(
            self.host
                .pick_folder()
                .map(|picked| picked.map(|p| path_to_identifier(&p))),
        );
    }

    fn minimize_window(&self) {
        self.host.minimize();
    }

    fn toggle_maximize(&self) -> Option<WindowState> {
        self.host.toggle_maximize()
    }

    fn close_window(&self) {
        self.host.close();
    }

    fn start_window_drag(&self) {
        self.host.start_drag();
    }

    fn toggle_fullscreen(&self) -> Option<WindowState> {
        self.host.toggle_fullscreen()
    }

    fn window_state(&self) -> Option<WindowState> {
        self.host.window_state()
    }

    fn is_fullscreen(&self) -> bool {
        self.host.is_fullscreen()
    }

    fn load_resource_data(&self, handle: ResourceHandle) -> Option<Vec<u8>> {
        self.host.load_resource(handle)
    }

    fn write_json_file(&self, identifier: &str, data: &Value) -> PlatformResult<()> {
        fs::write(identifier, to_pretty_json(data))?;
        Ok(())
    }

    fn is_absolute_identifier(&self, identifier: &str) -> bool {
        Path::new(identifier).is_absolute()
    }

    fn local_path(&self, identifier: &str) -> Option<PathBuf> {
        (!identifier.is_empty()).then(|| PathBuf::from(identifier))
    }

    fn list_workspace(&self, root: &str, done: Completion<DirEntry>) {
        done(scan_tree(Path::new(root)));
    }

    fn read_text_file(&self, identifier: &str, done: Completion<String>) {
        done(
            fs::read(identifier)
                .map(|bytes| self.decode_text(&bytes))
                .map_err(PlatformError::from),
        );
    }

    fn write_text_file(&self, identifier: &str, content: &str, done: Completion<()>) {
        done(fs::write(identifier, content).map_err(PlatformError::from));
    }

    fn create_item(&self, parent: &str, name: &str, is_directory: bool, done: Completion<String>) {
        done(create_item_at(parent, name, is_directory));
    }

    fn delete_item(&self, identifier: &str, done: Completion<()>) {
        done(delete_item_at(identifier));
    }

    fn list_all_subdirectories(&self, root: &str, done: Completion<Vec<String>>) {
        done(list_subdirectories(Path::new(root)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn adapter() -> DesktopAdapter {
        DesktopAdapter::new(Box::new(HeadlessHost::sink()))
    }

    // Runs a continuation-style call and returns what it completed with.
    fn complete<T: Send + 'static>(call: impl FnOnce(Completion<T>)) -> PlatformResult<T> {
        let slot: Arc<Mutex<Option<PlatformResult<T>>>> = Arc::new(Mutex::new(None));
        let writer = slot.clone();
        call(Box::new(move |result| *writer.lock().unwrap() = Some(result)));
        let result = slot.lock().unwrap().take();
        result.expect("desktop adapter must complete inline")
    }

    #[test]
    fn test_scan_tree_nests_and_skips_build() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::create_dir_all(root.join("build/assets")).unwrap();
        fs::create_dir_all(root.join("sub/build")).unwrap();
        fs::write(root.join("a.veritnote"), "[]").unwrap();
        fs::write(root.join("sub/b.veritnote"), "[]").unwrap();
        fs::write(root.join("sub/deeper/c.veritnote"), "[]").unwrap();

        let tree = scan_tree(root).unwrap();
        let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.veritnote", "sub"]);

        let sub = &tree.children[1];
        assert!(sub.is_directory);
        let sub_names: Vec<&str> = sub.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(sub_names, vec!["b.veritnote", "deeper"]);
        assert_eq!(sub.children[1].children[0].name, "c.veritnote");
        assert_eq!(
            sub.children[1].children[0].identifier,
            path_to_identifier(&root.join("sub/deeper/c.veritnote"))
        );
    }

    #[test]
    fn test_scan_tree_missing_root_fails() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            scan_tree(&dir.path().join("nope")),
            Err(PlatformError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_item_refuses_existing() {
        let dir = tempdir().unwrap();
        let parent = path_to_identifier(dir.path());
        let adapter = adapter();

        let created = complete(|done| adapter.create_item(&parent, "x.veritnote", false, done));
        assert!(created.is_ok());
        let again = complete(|done| adapter.create_item(&parent, "x.veritnote", false, done));
        assert!(matches!(again, Err(PlatformError::AlreadyExists(_))));

        let folder = complete(|done| adapter.create_item(&parent, "folder", true, done)).unwrap();
        assert!(Path::new(&folder).is_dir());
    }

    #[test]
    fn test_delete_item_removes_trees_and_tolerates_missing() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("f/g")).unwrap();
        fs::write(dir.path().join("f/g/x.veritnote"), "[]").unwrap();
        let adapter = adapter();

        let target = path_to_identifier(&dir.path().join("f"));
        assert!(complete(|done| adapter.delete_item(&target, done)).is_ok());
        assert!(!dir.path().join("f").exists());
        assert!(complete(|done| adapter.delete_item(&target, done)).is_ok());
    }

    #[test]
    fn test_read_json_file_defaults_to_empty_object() {
        let dir = tempdir().unwrap();
        let adapter = adapter();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{oops").unwrap();
        let bom = dir.path().join("bom.json");
        fs::write(&bom, "\u{feff}{\"a\":1}").unwrap();

        assert_eq!(adapter.read_json_file(&path_to_identifier(&bad)), serde_json::json!({}));
        assert_eq!(
            adapter.read_json_file(&path_to_identifier(&dir.path().join("missing"))),
            serde_json::json!({})
        );
        assert_eq!(
            adapter.read_json_file(&path_to_identifier(&bom)),
            serde_json::json!({"a": 1})
        );
    }

    #[test]
    fn test_identifier_combination() {
        let adapter = adapter();
        let root = std::env::temp_dir();
        let combined = adapter.combine_identifier(&path_to_identifier(&root), "veritnoteconfig");
        assert_eq!(adapter.parent_identifier(&combined), path_to_identifier(&root));
        assert!(adapter.is_absolute_identifier(&combined));
        assert!(!adapter.is_absolute_identifier("relative/doc.veritnote"));
    }

    #[test]
    fn test_list_all_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::create_dir_all(dir.path().join("c")).unwrap();
        fs::write(dir.path().join("a/file.txt"), "x").unwrap();
        let adapter = adapter();

        let dirs = complete(|done| {
            adapter.list_all_subdirectories(&path_to_identifier(dir.path()), done)
        })
        .unwrap();
        let expected: Vec<String> = ["a", "a/b", "c"]
            .iter()
            .map(|p| path_to_identifier(&dir.path().join(p)))
            .collect();
        assert_eq!(dirs, expected);
    }
}
