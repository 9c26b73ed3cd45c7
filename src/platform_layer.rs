pub mod adapter;
pub mod android;
pub mod codec;
pub mod desktop;
pub mod download;
pub mod error;
pub mod types;
pub use adapter::PlatformAdapter;
pub use error::{PlatformError, Result as PlatformResult};
pub use types::{Completion, DirEntry, WindowState};
