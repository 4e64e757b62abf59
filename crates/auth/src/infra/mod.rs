//! Infrastructure Layer
//!
//! Concrete stores and transports behind the domain traits.

pub mod console;
pub mod email;
pub mod json_file;
pub mod memory;
pub mod provider;

// Re-exports
pub use console::ConsoleOtpDelivery;
pub use email::{EmailDeliveryConfig, HttpOtpDelivery};
pub use json_file::JsonFileSessionStore;
pub use memory::InMemorySessionStore;
pub use provider::NoopProviderHandle;
