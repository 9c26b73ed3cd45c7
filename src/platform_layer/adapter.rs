/*
 * The capability set every host must provide. The router (`app_logic::handler`) is
 * written only against this trait; it never learns whether an identifier is a path
 * or a content URI, or whether an operation finished before the call returned.
 *
 * Operations whose mechanism differs between hosts come in two styles:
 * - Continuation style (`Completion<T>`): the document store and the dialogs. The
 *   desktop adapter completes inline; the Android adapter completes when the host
 *   runtime posts its result back.
 * - Synchronous style: the `IdentifierTree` primitives used by the folder-config
 *   cascade, `write_json_file`, resources and downloads. Android implements the
 *   identifier primitives by blocking on a platform-service round trip.
 *
 * Window operations default to no-ops for hosts without window chrome.
 */
use crate::core::config_cascade::IdentifierTree;
use crate::core::resource_map::ResourceHandle;
use crate::platform_layer::codec;
use crate::platform_layer::download;
use crate::platform_layer::error::Result as PlatformResult;
use crate::platform_layer::types::{Completion, DirEntry, WindowState};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub trait PlatformAdapter: IdentifierTree + Send + Sync {
    // --- UI surface ---

    // Best-effort push of one encoded envelope to the UI.
    fn post_message(&self, message_json: &str);
    fn navigate_to(&self, url: &str);
    fn open_external_link(&self, url: &str);

    // `Ok(None)` when the user cancelled.
    fn open_file_dialog(&self, done: Completion<Option<String>>);
    fn open_workspace_dialog(&self, done: Completion<Option<String>>);

    // --- Window chrome ---

    fn minimize_window(&self) {}
    // The state after toggling, or `None` when the host has no window.
    fn toggle_maximize(&self) -> Option<WindowState> {
        None
    }
    fn close_window(&self) {}
    fn start_window_drag(&self) {}
    fn toggle_fullscreen(&self) -> Option<WindowState> {
        None
    }
    fn window_state(&self) -> Option<WindowState> {
        None
    }
    fn is_fullscreen(&self) -> bool {
        false
    }

    // --- Codecs ---

    fn decode_text(&self, bytes: &[u8]) -> String {
        codec::decode_text(bytes)
    }
    fn url_decode(&self, encoded: &str) -> Option<String> {
        codec::percent_decode(encoded)
    }

    // --- Resources and downloads ---

    fn load_resource_data(&self, handle: ResourceHandle) -> Option<Vec<u8>>;

    fn download_file(
        &self,
        url: &str,
        destination: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> PlatformResult<()> {
        download::download_to_file(url, destination, on_progress)
    }

    // --- Identifier primitives beyond `IdentifierTree` ---

    fn write_json_file(&self, identifier: &str, data: &Value) -> PlatformResult<()>;
    // Whether `identifier` is complete, as opposed to relative to the workspace root.
    fn is_absolute_identifier(&self, identifier: &str) -> bool;
    /*
     * The local filesystem path behind `identifier`, if it has one. Export writes
     * straight to disk and is only offered when the workspace root has a local path.
     */
    fn local_path(&self, _identifier: &str) -> Option<PathBuf> {
        None
    }

    // --- Document store ---

    /*
     * Lists the workspace below `root`. Hosts that can recurse return the full
     * hierarchy; others return one level with folders left empty.
     */
    fn list_workspace(&self, root: &str, done: Completion<DirEntry>);
    fn read_text_file(&self, identifier: &str, done: Completion<String>);
    fn write_text_file(&self, identifier: &str, content: &str, done: Completion<()>);
    // Creates `name` under `parent`, failing if it exists. Yields the new identifier.
    fn create_item(&self, parent: &str, name: &str, is_directory: bool, done: Completion<String>);
    // Removes a file, or a folder with everything in it.
    fn delete_item(&self, identifier: &str, done: Completion<()>);
    // Every folder below `root`, at any depth, excluding `root` itself.
    fn list_all_subdirectories(&self, root: &str, done: Completion<Vec<String>>);
}
