/*
 * Per-backend mutable state: the active workspace root, the workspace path handed
 * to the editor page after navigation, and the export-cancel flag. Handlers may run
 * on several threads on Android (continuations resume on the result-delivery thread),
 * so everything is behind a lock or an atomic.
 */
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

#[derive(Debug, Default)]
pub struct SessionState {
    workspace_root: RwLock<String>,
    pending_workspace_path: Mutex<Option<String>>,
    export_cancelled: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    // Empty when no workspace is open.
    pub fn workspace_root(&self) -> String {
        match self.workspace_root.read() {
            Ok(root) => root.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn has_workspace_root(&self) -> bool {
        !self.workspace_root().is_empty()
    }

    pub fn set_workspace_root(&self, root: &str) {
        let mut guard = match self.workspace_root.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = root.to_string();
    }

    pub fn clear_workspace_root(&self) {
        self.set_workspace_root("");
    }

    pub fn pending_workspace_path(&self) -> Option<String> {
        match self.pending_workspace_path.lock() {
            Ok(pending) => pending.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_pending_workspace_path(&self, path: Option<&str>) {
        let mut guard = match self.pending_workspace_path.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = path.filter(|p| !p.is_empty()).map(str::to_string);
    }

    pub fn request_export_cancel(&self) {
        self.export_cancelled.store(true, Ordering::SeqCst);
    }

    pub fn reset_export_cancel(&self) {
        self.export_cancelled.store(false, Ordering::SeqCst);
    }

    pub fn export_cancel_requested(&self) -> bool {
        self.export_cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_lifecycle() {
        let state = SessionState::new();
        assert!(!state.has_workspace_root());
        state.set_workspace_root("/w");
        assert_eq!(state.workspace_root(), "/w");
        state.clear_workspace_root();
        assert!(!state.has_workspace_root());
    }

    #[test]
    fn test_pending_path_ignores_empty() {
        let state = SessionState::new();
        state.set_pending_workspace_path(Some(""));
        assert_eq!(state.pending_workspace_path(), None);
        state.set_pending_workspace_path(Some("/w"));
        assert_eq!(state.pending_workspace_path().as_deref(), Some("/w"));
        state.set_pending_workspace_path(None);
        assert_eq!(state.pending_workspace_path(), None);
    }

    #[test]
    fn test_export_cancel_flag() {
        let state = SessionState::new();
        state.request_export_cancel();
        assert!(state.export_cancel_requested());
        state.reset_export_cancel();
        assert!(!state.export_cancel_requested());
    }
}
