/*
 * Downloads a remote file to disk, reporting whole-percent progress. Used by the
 * export pipeline for images that live on the web. Progress is only reported when
 * the server announces a content length, and each percentage at most once.
 */
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

const CHUNK_SIZE: usize = 16 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub fn download_to_file(
    url: &str,
    destination: &Path,
    on_progress: &mut dyn FnMut(u8),
) -> PlatformResult<()> {
    log::debug!("Download: Fetching '{url}' to {destination:?}");
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    let total = response.content_length();

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(destination)?;
    match copy_with_progress(url, response, total, file, on_progress) {
        Ok(received) => {
            log::debug!("Download: Finished '{url}' ({received} bytes)");
            Ok(())
        }
        Err(e) => {
            // A partial file must not end up in the export.
            if let Err(remove_error) = fs::remove_file(destination) {
                log::warn!("Download: Could not remove partial {destination:?}: {remove_error}");
            }
            Err(e)
        }
    }
}

// Streams the body into `file`. Returns the number of bytes written.
fn copy_with_progress(
    url: &str,
    mut body: impl Read,
    total: Option<u64>,
    mut file: impl Write,
    on_progress: &mut dyn FnMut(u8),
) -> PlatformResult<u64> {
    let mut tracker = ProgressTracker::new(total);
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = body
            .read(&mut buffer)
            .map_err(|e| PlatformError::Download(format!("{url}: {e}")))?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])?;
        if let Some(percent) = tracker.advance(n as u64) {
            on_progress(percent);
        }
    }
    file.flush()?;
    Ok(tracker.received)
}

// Converts byte counts into distinct whole percentages.
struct ProgressTracker {
    total: Option<u64>,
    received: u64,
    last_reported: Option<u8>,
}

impl ProgressTracker {
    fn new(total: Option<u64>) -> Self {
        ProgressTracker {
            total: total.filter(|t| *t > 0),
            received: 0,
            last_reported: None,
        }
    }

    fn advance(&mut self, bytes: u64) -> Option<u8> {
        self.received += bytes;
        let total = self.total?;
        let percent = ((self.received.min(total) * 100) / total) as u8;
        if self.last_reported == Some(percent) {
            return None;
        }
        self.last_reported = Some(percent);
        Some(percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_progress_reports_each_percentage_once() {
        let mut tracker = ProgressTracker::new(Some(200));
        assert_eq!(tracker.advance(1), Some(0));
        assert_eq!(tracker.advance(0), None);
        assert_eq!(tracker.advance(99), Some(50));
        assert_eq!(tracker.advance(100), Some(100));
    }

    #[test]
    fn test_progress_without_length_is_silent() {
        let mut tracker = ProgressTracker::new(None);
        assert_eq!(tracker.advance(10), None);
        let mut zero = ProgressTracker::new(Some(0));
        assert_eq!(zero.advance(10), None);
    }

    #[test]
    fn test_progress_clamps_overshoot() {
        let mut tracker = ProgressTracker::new(Some(10));
        assert_eq!(tracker.advance(25), Some(100));
    }

    // Serves one response that announces more bytes than it sends, then hangs up.
    fn serve_truncated_body() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                let _ = stream.write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\npartial",
                );
            }
        });
        format!("http://{address}/cat.png")
    }

    #[test]
    fn test_truncated_download_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("src").join("cat.png");
        let url = serve_truncated_body();

        let result = download_to_file(&url, &dest, &mut |_| {});

        assert!(matches!(result, Err(PlatformError::Download(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn test_copy_with_progress_writes_everything() {
        let body: &[u8] = &[7u8; 300];
        let mut out = Vec::new();
        let mut reported = Vec::new();

        let received =
            copy_with_progress("mem", body, Some(300), &mut out, &mut |p| reported.push(p))
                .unwrap();

        assert_eq!(received, 300);
        assert_eq!(out.len(), 300);
        assert_eq!(reported.last(), Some(&100));
    }

    #[test]
    fn test_download_of_unreachable_url_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("x.png");
        let mut calls = 0;
        // Port 9 (discard) on localhost is closed in test environments.
        let result = download_to_file("http://127.0.0.1:9/x.png", &dest, &mut |_| calls += 1);
        assert!(result.is_err());
        assert_eq!(calls, 0);
    }
}
