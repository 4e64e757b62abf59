//! Collaborator Traits
//!
//! Interfaces for the session store, the challenge delivery transport,
//! and the federated provider handle. Implementations live in the
//! infrastructure layer.

use crate::domain::entity::{otp_challenge::OtpChallenge, session::Session};
use crate::error::AuthResult;

/// What the single session slot held when it was read.
///
/// `Corrupt` lets the caller distinguish "nothing persisted" from
/// "record present but unreadable" without `load` failing on malformed
/// content; clearing the corrupt slot is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredSession {
    /// A deserializable session record
    Present(Session),
    /// The slot is empty
    Absent,
    /// The slot holds something that is not a session record
    Corrupt,
}

/// Durable single-slot session persistence.
///
/// Overwrite semantics: no history, no multi-session support. The only
/// purpose of the stored copy is to reconstruct the in-memory session
/// on the next process start.
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Persist the session, replacing any existing record
    async fn save(&self, session: &Session) -> AuthResult<()>;

    /// Read the slot. Malformed content is reported as
    /// [`StoredSession::Corrupt`], never as an error.
    async fn load(&self) -> AuthResult<StoredSession>;

    /// Empty the slot. Clearing an already-empty slot succeeds.
    async fn clear(&self) -> AuthResult<()>;
}

/// How far a delivery got.
///
/// Transports that only know their request was accepted must report
/// `Submitted`; `Confirmed` is reserved for transports that can attest
/// the code actually reached the user. The distinction exists so that
/// "the HTTP call returned 200" is never silently promoted to "the
/// email arrived".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport accepted the send request
    Submitted,
    /// The code demonstrably reached the user
    Confirmed,
}

/// Outbound challenge delivery.
///
/// One shot per call: failures are reported back, never retried
/// internally. Re-issuing the challenge is the retry mechanism.
#[trait_variant::make(OtpDelivery: Send)]
pub trait LocalOtpDelivery {
    /// Transmit the challenge's code to its recipient
    async fn send(&self, challenge: &OtpChallenge) -> AuthResult<DeliveryOutcome>;
}

/// One-way hints to the federated identity provider.
pub trait ProviderHandle {
    /// Tell the provider not to auto-select this account on the next
    /// load. Fire-and-forget: no result, no retry.
    fn disable_auto_select(&self);
}
