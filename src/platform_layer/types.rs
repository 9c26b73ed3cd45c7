/*
 * Data types shared between the router and the platform adapters: the completion
 * callback used by asynchronous adapter operations, the window states reported to
 * the UI, and the raw directory listing (re-exported from the core, which turns it
 * into the sidebar tree).
 */
use crate::platform_layer::error::Result as PlatformResult;

pub use crate::core::workspace_tree::DirEntry;

/*
 * Receives the outcome of an asynchronous adapter operation. The desktop adapter
 * calls it before returning; the Android adapter calls it later, from the thread that
 * delivers the host's platform-service result. Either way it is called exactly once.
 */
pub type Completion<T> = Box<dyn FnOnce(PlatformResult<T>) + Send + 'static>;

// Window states as named on the wire (`windowStateChanged`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Maximized,
    Restored,
    Fullscreen,
    RestoredFromFullscreen,
}

impl WindowState {
    pub fn as_str(self) -> &'static str {
        match self {
            WindowState::Maximized => "maximized",
            WindowState::Restored => "restored",
            WindowState::Fullscreen => "fullscreen",
            WindowState::RestoredFromFullscreen => "restored_from_fullscreen",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_state_wire_names() {
        assert_eq!(WindowState::Maximized.as_str(), "maximized");
        assert_eq!(WindowState::Restored.as_str(), "restored");
        assert_eq!(WindowState::Fullscreen.as_str(), "fullscreen");
        assert_eq!(
            WindowState::RestoredFromFullscreen.as_str(),
            "restored_from_fullscreen"
        );
    }
}
