//! Domain Layer
//!
//! Contains entities, value objects, credential decoding, and the
//! collaborator traits.

pub mod credential;
pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    identity_claim::IdentityClaim,
    otp_challenge::{ChallengeInfo, OtpChallenge},
    session::Session,
};
pub use repository::{DeliveryOutcome, OtpDelivery, ProviderHandle, SessionStore, StoredSession};
pub use value_object::{email::Email, otp_code::OtpCode};
