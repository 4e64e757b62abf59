//! Auth (Authentication Session) Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, credential decoding, collaborator traits
//! - `application/` - The session manager state machine and its configuration
//! - `infra/` - Store and transport implementations
//!
//! ## Features
//! - Federated sign-in from a provider-issued bearer token (JWT-shaped)
//! - Email OTP sign-in with a 6-digit one-time code
//! - Single-slot session persistence across process restarts
//! - Optional challenge expiry and verification attempt cap
//!
//! ## Security Model
//! This is a client-side core and inherits the original design's trust
//! boundaries, documented rather than silently hardened:
//! - The federated token's signature is NOT verified locally; the
//!   provider's transport is trusted to have validated it
//! - OTP codes are generated and checked on the client with no
//!   server-side secret
//! - A restored persisted session is trusted as-is
//!
//! A deployment that needs real guarantees must move token
//! verification and OTP issuance behind a server boundary.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::session_manager::{AuthState, SessionManager};
pub use error::{AuthError, AuthResult};
pub use infra::json_file::JsonFileSessionStore;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::identity_claim::IdentityClaim;
    pub use crate::domain::entity::otp_challenge::{ChallengeInfo, OtpChallenge};
    pub use crate::domain::entity::session::Session;
    pub use crate::domain::value_object::{email::Email, otp_code::OtpCode};
}

pub mod store {
    pub use crate::domain::repository::{SessionStore, StoredSession};
    pub use crate::infra::json_file::JsonFileSessionStore;
    pub use crate::infra::memory::InMemorySessionStore;
}

pub mod delivery {
    pub use crate::domain::repository::{DeliveryOutcome, OtpDelivery};
    pub use crate::infra::console::ConsoleOtpDelivery;
    pub use crate::infra::email::{EmailDeliveryConfig, HttpOtpDelivery};
}

pub mod provider {
    pub use crate::domain::repository::ProviderHandle;
    pub use crate::infra::provider::NoopProviderHandle;
}
