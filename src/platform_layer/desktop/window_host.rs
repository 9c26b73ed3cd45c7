/*
 * What the desktop adapter needs from the process hosting the web view: a channel
 * to the page, native dialogs, the resource bundle and window chrome. The adapter
 * owns all file I/O itself, so a host only deals with the UI side.
 */
use crate::core::resource_map::ResourceHandle;
use crate::platform_layer::error::Result as PlatformResult;
use crate::platform_layer::types::WindowState;
use std::path::PathBuf;
use std::sync::Arc;

pub trait WindowHost: Send + Sync {
    fn post_message(&self, message_json: &str);
    fn navigate_to(&self, url: &str);
    fn open_external_link(&self, url: &str);

    // `Ok(None)` when the user cancelled.
    fn pick_image_file(&self) -> PlatformResult<Option<PathBuf>>;
    fn pick_folder(&self) -> PlatformResult<Option<PathBuf>>;

    fn load_resource(&self, handle: ResourceHandle) -> Option<Vec<u8>>;

    fn minimize(&self);
    fn toggle_maximize(&self) -> Option<WindowState>;
    fn close(&self);
    fn start_drag(&self);
    fn toggle_fullscreen(&self) -> Option<WindowState>;
    fn window_state(&self) -> Option<WindowState>;
    fn is_fullscreen(&self) -> bool;
}

// Lets the embedding process keep a handle on the host it gave to the adapter.
impl<T: WindowHost + ?Sized> WindowHost for Arc<T> {
    fn post_message(&self, message_json: &str) {
        (**self).post_message(message_json)
    }
    fn navigate_to(&self, url: &str) {
        (**self).navigate_to(url)
    }
    fn open_external_link(&self, url: &str) {
        (**self).open_external_link(url)
    }
    fn pick_image_file(&self) -> PlatformResult<Option<PathBuf>> {
        (**self).pick_image_file()
    }
    fn pick_folder(&self) -> PlatformResult<Option<PathBuf>> {
        (**self).pick_folder()
    }
    fn load_resource(&self, handle: ResourceHandle) -> Option<Vec<u8>> {
        (**self).load_resource(handle)
    }
    fn minimize(&self) {
        (**self).minimize()
    }
    fn toggle_maximize(&self) -> Option<WindowState> {
        (**self).toggle_maximize()
    }
    fn close(&self) {
        (**self).close()
    }
    fn start_drag(&self) {
        (**self).start_drag()
    }
    fn toggle_fullscreen(&self) -> Option<WindowState> {
        (**self).toggle_fullscreen()
    }
    fn window_state(&self) -> Option<WindowState> {
        (**self).window_state()
    }
    fn is_fullscreen(&self) -> bool {
        (**self).is_fullscreen()
    }
}
