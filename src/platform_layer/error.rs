#[cfg(target_os = "android")]
use jni::errors::Error as JniError;
#[cfg(target_os = "windows")]
use windows::core::Error as WinError;

// Represents errors that can occur within the platform abstraction layer.
//
// Adapters produce these; the router never lets one escape to the UI as anything
// other than an `error` string in a response.
#[derive(Debug)]
pub enum PlatformError {
    /// An error originating from the Windows API.
    #[cfg(target_os = "windows")]
    Win32(WinError),
    /// A call across the JNI boundary failed.
    #[cfg(target_os = "android")]
    Jni(JniError),
    /// A local file operation failed.
    Io(std::io::Error),
    /// A document or service message was not valid JSON.
    Json(serde_json::Error),
    /// The addressed file, folder or resource does not exist.
    NotFound(String),
    /// An item with the requested name already exists.
    AlreadyExists(String),
    /// The host cannot perform this operation at all.
    Unsupported(String),
    /// The host runtime answered a platform-service request with a failure, or never answered.
    Service(String),
    /// The host runtime is not attached, so nothing can be delivered to it.
    Disconnected(String),
    /// Fetching a remote file failed.
    Download(String),
}

#[cfg(target_os = "windows")]
impl From<WinError> for PlatformError {
    fn from(err: WinError) -> Self {
        PlatformError::Win32(err)
    }
}

#[cfg(target_os = "android")]
impl From<JniError> for PlatformError {
    fn from(err: JniError) -> Self {
        PlatformError::Jni(err)
    }
}

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => PlatformError::NotFound(err.to_string()),
            std::io::ErrorKind::AlreadyExists => PlatformError::AlreadyExists(err.to_string()),
            _ => PlatformError::Io(err),
        }
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        PlatformError::Json(err)
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        PlatformError::Download(err.to_string())
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_os = "windows")]
            PlatformError::Win32(e) => write!(f, "Win32 Error: {}", e),
            #[cfg(target_os = "android")]
            PlatformError::Jni(e) => write!(f, "JNI Error: {}", e),
            PlatformError::Io(e) => write!(f, "I/O Error: {}", e),
            PlatformError::Json(e) => write!(f, "JSON Error: {}", e),
            PlatformError::NotFound(s) => write!(f, "Not Found: {}", s),
            PlatformError::AlreadyExists(s) => write!(f, "Already Exists: {}", s),
            PlatformError::Unsupported(s) => write!(f, "Unsupported: {}", s),
            PlatformError::Service(s) => write!(f, "Platform Service Failed: {}", s),
            PlatformError::Disconnected(s) => write!(f, "Host Disconnected: {}", s),
            PlatformError::Download(s) => write!(f, "Download Failed: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(target_os = "windows")]
            PlatformError::Win32(e) => Some(e),
            #[cfg(target_os = "android")]
            PlatformError::Jni(e) => Some(e),
            PlatformError::Io(e) => Some(e),
            PlatformError::Json(e) => Some(e),
            _ => None,
        }
    }
}

/// A specialized `Result` type for platform layer operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_kinds_map_to_specific_variants() {
        let missing: PlatformError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(missing, PlatformError::NotFound(_)));

        let exists: PlatformError = io::Error::new(io::ErrorKind::AlreadyExists, "dup").into();
        assert!(matches!(exists, PlatformError::AlreadyExists(_)));

        let other: PlatformError = io::Error::other("disk on fire").into();
        assert!(matches!(other, PlatformError::Io(_)));
        assert!(std::error::Error::source(&other).is_some());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = PlatformError::Service("listDirectory refused".to_string());
        assert_eq!(err.to_string(), "Platform Service Failed: listDirectory refused");
    }
}
