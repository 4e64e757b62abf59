//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Every variant leaves the session manager in a stable state; none of
//! them is fatal to the process.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
///
/// `Clone` is intentional: the session manager keeps the most recent
/// error in a single current-error slot for the UI while also returning
/// it to the caller.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Federated token could not be decoded (not retriable, the user
    /// must restart the sign-in from scratch)
    #[error("Malformed federated credential: {0}")]
    CredentialDecode(String),

    /// Verification code could not be sent (retriable by re-issuing)
    #[error("Failed to send verification code: {0}")]
    Delivery(String),

    /// Submitted code did not match (retriable, the challenge survives)
    #[error("Invalid verification code")]
    CodeMismatch,

    /// A code was submitted but no challenge is pending
    #[error("No verification code is pending")]
    NoPendingChallenge,

    /// Pending challenge exceeded its configured time-to-live
    #[error("Verification code has expired")]
    ChallengeExpired,

    /// Configured verification attempt budget exhausted
    #[error("Too many failed verification attempts")]
    TooManyAttempts,

    /// A user is already signed in
    #[error("Already signed in")]
    AlreadySignedIn,

    /// Input validation failed (email format etc.)
    #[error("{0}")]
    Validation(String),

    /// Session persistence failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::CredentialDecode(_) | AuthError::Validation(_) => ErrorKind::InvalidInput,
            AuthError::Delivery(_) => ErrorKind::External,
            AuthError::CodeMismatch => ErrorKind::Unauthorized,
            AuthError::NoPendingChallenge | AuthError::AlreadySignedIn => ErrorKind::Conflict,
            AuthError::ChallengeExpired => ErrorKind::Gone,
            AuthError::TooManyAttempts => ErrorKind::TooManyAttempts,
            AuthError::Storage(_) => ErrorKind::Storage,
            AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the user can retry without restarting the whole flow.
    ///
    /// A delivery failure is retriable by re-issuing the challenge; a
    /// mismatch is retriable against the surviving challenge.
    pub fn is_retriable(&self) -> bool {
        matches!(self, AuthError::Delivery(_) | AuthError::CodeMismatch)
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AuthError::Storage(msg) => {
                tracing::error!(message = %msg, "Session storage error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Delivery(msg) => {
                tracing::warn!(message = %msg, "Verification code delivery failed");
            }
            AuthError::CodeMismatch => {
                tracing::warn!("Invalid verification code attempt");
            }
            AuthError::TooManyAttempts => {
                tracing::warn!("Verification attempt budget exhausted");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => AuthError::Validation(err.message().to_string()),
            ErrorKind::Storage => AuthError::Storage(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}
