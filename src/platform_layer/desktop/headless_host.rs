/*
 * A window host without a window. Messages for the UI are written as one JSON line
 * each to an output stream (stdout for the stdio host, a buffer in tests). Window
 * chrome is simulated so the state notifications stay consistent, and dialogs report
 * a cancel since there is nobody to answer them.
 *
 * Resources are looked up below an optional assets directory by their virtual path;
 * the welcome page is compiled in as a fallback so a first run always seeds it.
 */
use crate::core::message::OutboundMessage;
use crate::core::resource_map::{ResourceHandle, ResourceMap, WELCOME_PAGE};
use crate::platform_layer::desktop::window_host::WindowHost;
use crate::platform_layer::error::Result as PlatformResult;
use crate::platform_layer::types::WindowState;
use serde_json::json;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

const EMBEDDED_WELCOME_PAGE: &[u8] = include_bytes!("../../../assets/welcome.veritnote");

// Host-level lines, distinguishable from envelopes meant for the UI.
pub const HOST_NAVIGATE: &str = "host:navigate";
pub const HOST_OPEN_EXTERNAL: &str = "host:openExternalLink";

pub struct HeadlessHost {
    out: Mutex<Box<dyn Write + Send>>,
    assets_dir: Option<PathBuf>,
    resources: ResourceMap,
    maximized: AtomicBool,
    fullscreen: AtomicBool,
    close_requested: AtomicBool,
}

impl HeadlessHost {
    pub fn new(out: Box<dyn Write + Send>, assets_dir: Option<&Path>) -> Self {
        HeadlessHost {
            out: Mutex::new(out),
            assets_dir: assets_dir.map(Path::to_path_buf),
            resources: ResourceMap::bundled(),
            maximized: AtomicBool::new(false),
            fullscreen: AtomicBool::new(false),
            close_requested: AtomicBool::new(false),
        }
    }

    pub fn stdout(assets_dir: Option<&Path>) -> Self {
        Self::new(Box::new(io::stdout()), assets_dir)
    }

    // Discards all output.
    pub fn sink() -> Self {
        Self::new(Box::new(io::sink()), None)
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested.load(Ordering::SeqCst)
    }

    fn write_line(&self, line: &str) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            log::error!("HeadlessHost: Failed to write message: {e}");
        }
    }

    fn write_host_event(&self, action: &str, url: &str) {
        match OutboundMessage::new(action).with_payload(json!({ "url": url })).encode() {
            Ok(line) => self.write_line(&line),
            Err(e) => log::error!("HeadlessHost: Failed to encode {action}: {e}"),
        }
    }
}

impl WindowHost for HeadlessHost {
    fn post_message(&self, message_json: &str) {
        self.write_line(message_json);
    }

    fn navigate_to(&self, url: &str) {
        self.write_host_event(HOST_NAVIGATE, url);
    }

    fn open_external_link(&self, url: &str) {
        self.write_host_event(HOST_OPEN_EXTERNAL, url);
    }

    fn pick_image_file(&self) -> PlatformResult<Option<PathBuf>> {
        log::debug!("HeadlessHost: No file dialog available, reporting cancel.");
        Ok(None)
    }

    fn pick_folder(&self) -> PlatformResult<Option<PathBuf>> {
        log::debug!("HeadlessHost: No folder dialog available, reporting cancel.");
        Ok(None)
    }

    fn load_resource(&self, handle: ResourceHandle) -> Option<Vec<u8>> {
        let virtual_path = self.resources.path_for(handle)?;
        if let Some(dir) = &self.assets_dir {
            let candidate = dir.join(virtual_path.trim_start_matches('/'));
            match fs::read(&candidate) {
                Ok(bytes) => return Some(bytes),
                Err(e) => log::debug!("HeadlessHost: Resource {candidate:?} unavailable: {e}"),
            }
        }
        (virtual_path == WELCOME_PAGE).then(|| EMBEDDED_WELCOME_PAGE.to_vec())
    }

    fn minimize(&self) {
        log::debug!("HeadlessHost: minimize");
    }

    fn toggle_maximize(&self) -> Option<WindowState> {
        let was_maximized = self.maximized.fetch_xor(true, Ordering::SeqCst);
        Some(if was_maximized {
            WindowState::Restored
        } else {
            WindowState::Maximized
        })
    }

    fn close(&self) {
        self.close_requested.store(true, Ordering::SeqCst);
    }

    fn start_drag(&self) {}

    fn toggle_fullscreen(&self) -> Option<WindowState> {
        let was_fullscreen = self.fullscreen.fetch_xor(true, Ordering::SeqCst);
        Some(if was_fullscreen {
            WindowState::RestoredFromFullscreen
        } else {
            WindowState::Fullscreen
        })
    }

    fn window_state(&self) -> Option<WindowState> {
        Some(if self.maximized.load(Ordering::SeqCst) {
            WindowState::Maximized
        } else {
            WindowState::Restored
        })
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }
}
