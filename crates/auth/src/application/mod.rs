//! Application Layer
//!
//! The session manager state machine and its configuration.

pub mod config;
pub mod session_manager;

// Re-exports
pub use config::AuthConfig;
pub use session_manager::{AuthState, SessionManager};
