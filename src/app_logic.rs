pub mod export;
pub mod handler;
pub mod session_state;

pub use handler::Backend;
pub use session_state::SessionState;
