//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum used to classify every [`AppError`].
//!
//! [`AppError`]: super::app_error::AppError

use serde::Serialize;

/// Coarse error classification.
///
/// Variants describe who is at fault and whether retrying makes sense,
/// independent of any transport. Marked `non_exhaustive` so new
/// classifications can be added without breaking downstream matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// The caller supplied input that fails validation
    InvalidInput,
    /// The caller is not authenticated for the operation
    Unauthorized,
    /// The referenced record does not exist
    NotFound,
    /// The operation conflicts with current state
    Conflict,
    /// The resource existed but is no longer usable (expired, consumed)
    Gone,
    /// Too many attempts in too short a window
    TooManyAttempts,
    /// A durable storage operation failed
    Storage,
    /// An external collaborator (delivery provider, identity provider) failed
    External,
    /// An invariant was broken inside this process
    Internal,
}

impl ErrorKind {
    /// Human-readable label for the classification.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Invalid Input",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Gone => "Gone",
            ErrorKind::TooManyAttempts => "Too Many Attempts",
            ErrorKind::Storage => "Storage",
            ErrorKind::External => "External",
            ErrorKind::Internal => "Internal",
        }
    }

    /// Whether this error is the fault of this process or its
    /// infrastructure rather than the caller. These should be logged
    /// at error level.
    #[inline]
    pub const fn is_internal_fault(&self) -> bool {
        matches!(
            self,
            ErrorKind::Storage | ErrorKind::External | ErrorKind::Internal
        )
    }

    /// Whether the caller can reasonably retry the same operation.
    #[inline]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Storage | ErrorKind::External | ErrorKind::TooManyAttempts
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
