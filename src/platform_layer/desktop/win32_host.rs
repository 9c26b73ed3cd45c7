/*
 * The Windows window host. Owns nothing but the top-level window handle and the
 * channel into the embedded web view; the web view itself is created by the
 * embedding shell, which forwards web messages to `Backend::handle_message` on the
 * UI thread and hands a `WebViewChannel` here for the way back.
 *
 * Bundled resources are RCDATA entries compiled into the executable from `app.rc`,
 * addressed by the numeric id carried in `ResourceHandle`. Native dialogs use the
 * COM `IFileOpenDialog` and therefore must be shown from the UI thread.
 */
use crate::core::resource_map::ResourceHandle;
use crate::platform_layer::desktop::window_host::WindowHost;
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use crate::platform_layer::types::WindowState;

use std::ffi::c_void;
use std::path::PathBuf;
use std::sync::Mutex;

use windows::{
    Win32::{
        Foundation::{HWND, LPARAM, RPC_E_CHANGED_MODE, S_FALSE, WPARAM},
        Graphics::Gdi::{GetMonitorInfoW, MONITOR_DEFAULTTOPRIMARY, MONITORINFO, MonitorFromWindow},
        System::Com::{
            CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED, CoCreateInstance, CoInitializeEx,
            CoTaskMemFree,
        },
        System::LibraryLoader::{FindResourceW, LoadResource, LockResource, SizeofResource},
        UI::Input::KeyboardAndMouse::ReleaseCapture,
        UI::Shell::Common::COMDLG_FILTERSPEC,
        UI::Shell::{
            FILEOPENDIALOGOPTIONS, FOS_PICKFOLDERS, FileOpenDialog, IFileOpenDialog,
            SIGDN_FILESYSPATH, ShellExecuteW,
        },
        UI::WindowsAndMessaging::{
            GWL_STYLE, GetWindowLongW, GetWindowPlacement, HTCAPTION, HWND_TOP, PostMessageW,
            RT_RCDATA, SW_MAXIMIZE, SW_MINIMIZE, SW_RESTORE, SW_SHOWMAXIMIZED, SW_SHOWNORMAL,
            SWP_FRAMECHANGED, SWP_NOMOVE, SWP_NOOWNERZORDER, SWP_NOSIZE, SWP_NOZORDER,
            SendMessageW, SetWindowLongW, SetWindowPlacement,
            SetWindowPos, ShowWindow, WINDOWPLACEMENT, WM_CLOSE, WM_NCLBUTTONDOWN,
            WS_OVERLAPPEDWINDOW,
        },
    },
    core::{HSTRING, PCWSTR, w},
};

const IMAGE_FILTER_SPEC: &str = "*.jpg;*.jpeg;*.png;*.gif;*.bmp;*.webp";

// The channel into the embedded web view, implemented by the embedding shell.
pub trait WebViewChannel: Send + Sync {
    fn post_web_message_as_json(&self, message_json: &str);
    fn navigate(&self, url: &str);
}

pub struct Win32Host {
    // Raw HWND value; HWND itself is not Send.
    hwnd_raw: isize,
    channel: Box<dyn WebViewChannel>,
    // Placement to restore when leaving fullscreen. `Some` while fullscreen.
    saved_placement: Mutex<Option<WINDOWPLACEMENT>>,
}

impl Win32Host {
    pub fn new(hwnd: HWND, channel: Box<dyn WebViewChannel>) -> PlatformResult<Self> {
        unsafe {
            let hr = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
            if hr.is_err() && hr != S_FALSE && hr != RPC_E_CHANGED_MODE {
                return Err(PlatformError::Unsupported(format!(
                    "CoInitializeEx failed: {hr:?}"
                )));
            }
        }
        Ok(Win32Host {
            hwnd_raw: hwnd.0 as isize,
            channel,
            saved_placement: Mutex::new(None),
        })
    }

    fn hwnd(&self) -> HWND {
        HWND(self.hwnd_raw as *mut c_void)
    }

    fn placement(&self) -> Option<WINDOWPLACEMENT> {
        let mut placement = WINDOWPLACEMENT {
            length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        match unsafe { GetWindowPlacement(self.hwnd(), &mut placement) } {
            Ok(()) => Some(placement),
            Err(e) => {
                log::warn!("Win32Host: GetWindowPlacement failed: {e:?}");
                None
            }
        }
    }

    fn show_file_dialog(&self, pick_folders: bool) -> PlatformResult<Option<PathBuf>> {
        let dialog: IFileOpenDialog =
            unsafe { CoCreateInstance(&FileOpenDialog, None, CLSCTX_INPROC_SERVER) }?;
        unsafe {
            if pick_folders {
                let options = dialog.GetOptions().unwrap_or(FILEOPENDIALOGOPTIONS(0));
                dialog.SetOptions(options | FOS_PICKFOLDERS)?;
                if let Err(e) = dialog.SetTitle(&HSTRING::from("Select Workspace Folder")) {
                    log::warn!("Win32Host: IFileOpenDialog::SetTitle failed: {e:?}");
                }
            } else {
                let spec = HSTRING::from(IMAGE_FILTER_SPEC);
                let filters = [COMDLG_FILTERSPEC {
                    pszName: w!("Image Files"),
                    pszSpec: PCWSTR(spec.as_ptr()),
                }];
                dialog.SetFileTypes(&filters)?;
            }

            if dialog.Show(Some(self.hwnd())).is_err() {
                log::debug!("Win32Host: File dialog cancelled.");
                return Ok(None);
            }
            let item = dialog.GetResult()?;
            let pwstr_path = item.GetDisplayName(SIGDN_FILESYSPATH)?;
            let path_string = pwstr_path.to_string().unwrap_or_default();
            CoTaskMemFree(Some(pwstr_path.as_ptr() as *const c_void));
            if path_string.is_empty() {
                return Ok(None);
            }
            Ok(Some(PathBuf::from(path_string)))
        }
    }

    fn enter_fullscreen(&self, saved: &mut Option<WINDOWPLACEMENT>) -> PlatformResult<()> {
        let hwnd = self.hwnd();
        let Some(placement) = self.placement() else {
            return Err(PlatformError::Unsupported(
                "Window placement unavailable.".to_string(),
            ));
        };
        unsafe {
            let monitor = MonitorFromWindow(hwnd, MONITOR_DEFAULTTOPRIMARY);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if !GetMonitorInfoW(monitor, &mut info).as_bool() {
                return Err(PlatformError::Unsupported(
                    "GetMonitorInfoW failed.".to_string(),
                ));
            }
            let style = GetWindowLongW(hwnd, GWL_STYLE);
            SetWindowLongW(hwnd, GWL_STYLE, style & !(WS_OVERLAPPEDWINDOW.0 as i32));
            let rect = info.rcMonitor;
            SetWindowPos(
                hwnd,
                Some(HWND_TOP),
                rect.left,
                rect.top,
                rect.right - rect.left,
                rect.bottom - rect.top,
                SWP_NOOWNERZORDER | SWP_FRAMECHANGED,
            )?;
        }
        *saved = Some(placement);
        Ok(())
    }

    fn leave_fullscreen(&self, placement: &WINDOWPLACEMENT) -> PlatformResult<()> {
        let hwnd = self.hwnd();
        unsafe {
            let style = GetWindowLongW(hwnd, GWL_STYLE);
            SetWindowLongW(hwnd, GWL_STYLE, style | WS_OVERLAPPEDWINDOW.0 as i32);
            SetWindowPlacement(hwnd, placement)?;
            SetWindowPos(
                hwnd,
                None,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOOWNERZORDER
                    | SWP_FRAMECHANGED,
            )?;
        }
        Ok(())
    }
}

impl WindowHost for Win32Host {
    fn post_message(&self, message_json: &str) {
        self.channel.post_web_message_as_json(message_json);
    }

    fn navigate_to(&self, url: &str) {
        self.channel.navigate(url);
    }

    fn open_external_link(&self, url: &str) {
        let result = unsafe {
            ShellExecuteW(
                Some(self.hwnd()),
                w!("open"),
                &HSTRING::from(url),
                None,
                None,
                SW_SHOWNORMAL,
            )
        };
        // ShellExecuteW reports success with a value above 32.
        if (result.0 as isize) <= 32 {
            log::error!("Win32Host: ShellExecuteW failed for '{url}': {:?}", result.0);
        }
    }

    fn pick_image_file(&self) -> PlatformResult<Option<PathBuf>> {
        self.show_file_dialog(false)
    }

    fn pick_folder(&self) -> PlatformResult<Option<PathBuf>> {
        self.show_file_dialog(true)
    }

    fn load_resource(&self, handle: ResourceHandle) -> Option<Vec<u8>> {
        unsafe {
            // MAKEINTRESOURCE: the id travels in the pointer value.
            let name = PCWSTR(handle.0 as usize as *const u16);
            let resource = FindResourceW(None, name, RT_RCDATA);
            if resource.is_invalid() {
                log::warn!("Win32Host: Resource {} not found.", handle.0);
                return None;
            }
            let loaded = match LoadResource(None, resource) {
                Ok(loaded) => loaded,
                Err(e) => {
                    log::error!("Win32Host: LoadResource {} failed: {e:?}", handle.0);
                    return None;
                }
            };
            let size = SizeofResource(None, resource) as usize;
            let data = LockResource(loaded) as *const u8;
            if data.is_null() || size == 0 {
                return None;
            }
            Some(std::slice::from_raw_parts(data, size).to_vec())
        }
    }

    fn minimize(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd(), SW_MINIMIZE);
        }
    }

    fn toggle_maximize(&self) -> Option<WindowState> {
        let next = match self.window_state()? {
            WindowState::Maximized => WindowState::Restored,
            _ => WindowState::Maximized,
        };
        let command = if next == WindowState::Maximized {
            SW_MAXIMIZE
        } else {
            SW_RESTORE
        };
        unsafe {
            let _ = ShowWindow(self.hwnd(), command);
        }
        Some(next)
    }

    fn close(&self) {
        if let Err(e) = unsafe { PostMessageW(Some(self.hwnd()), WM_CLOSE, WPARAM(0), LPARAM(0)) } {
            log::error!("Win32Host: PostMessageW(WM_CLOSE) failed: {e:?}");
        }
    }

    fn start_drag(&self) {
        unsafe {
            if let Err(e) = ReleaseCapture() {
                log::debug!("Win32Host: ReleaseCapture failed: {e:?}");
            }
            SendMessageW(
                self.hwnd(),
                WM_NCLBUTTONDOWN,
                Some(WPARAM(HTCAPTION as usize)),
                Some(LPARAM(0)),
            );
        }
    }

    fn toggle_fullscreen(&self) -> Option<WindowState> {
        let mut saved = match self.saved_placement.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match saved.take() {
            Some(placement) => {
                if let Err(e) = self.leave_fullscreen(&placement) {
                    log::error!("Win32Host: Leaving fullscreen failed: {e}");
                }
                Some(WindowState::RestoredFromFullscreen)
            }
            None => match self.enter_fullscreen(&mut saved) {
                Ok(()) => Some(WindowState::Fullscreen),
                Err(e) => {
                    log::error!("Win32Host: Entering fullscreen failed: {e}");
                    None
                }
            },
        }
    }

    fn window_state(&self) -> Option<WindowState> {
        let placement = self.placement()?;
        Some(if placement.showCmd == SW_SHOWMAXIMIZED.0 as u32 {
            WindowState::Maximized
        } else {
            WindowState::Restored
        })
    }

    fn is_fullscreen(&self) -> bool {
        self.saved_placement
            .lock()
            .map(|saved| saved.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_resource_id_is_none() {
        struct NullChannel;
        impl WebViewChannel for NullChannel {
            fn post_web_message_as_json(&self, _message_json: &str) {}
            fn navigate(&self, _url: &str) {}
        }
        let host = Win32Host::new(HWND::default(), Box::new(NullChannel)).unwrap();
        assert!(host.load_resource(ResourceHandle(65000)).is_none());
        assert!(!host.is_fullscreen());
    }
}
