//! OTP Challenge Entity
//!
//! A pending email verification challenge. At most one challenge is
//! pending at a time; the session manager replacing its single pending
//! slot is what makes issuance atomic (last-issued-wins).
//!
//! A challenge is write-once-read-once: once matched or superseded it
//! is discarded. A failed attempt does NOT discard it.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::value_object::{email::Email, otp_code::OtpCode};

/// Pending OTP challenge
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    /// Address the code was sent to
    pub recipient: Email,
    /// Display name used in the delivery and the eventual session
    pub display_name: String,
    /// The generated code (redacted in Debug output)
    code: OtpCode,
    /// Issuance instant
    pub issued_at: DateTime<Utc>,
    /// Failed verification attempts against this challenge
    attempts: u32,
}

impl OtpChallenge {
    /// Issue a new challenge with a freshly generated code
    pub fn issue(recipient: Email, display_name: impl Into<String>) -> Self {
        Self::with_code(recipient, display_name, OtpCode::generate())
    }

    /// Construct a challenge around a known code
    pub fn with_code(recipient: Email, display_name: impl Into<String>, code: OtpCode) -> Self {
        Self {
            recipient,
            display_name: display_name.into(),
            code,
            issued_at: Utc::now(),
            attempts: 0,
        }
    }

    /// The code, for the delivery adapter to transmit
    pub fn code(&self) -> &OtpCode {
        &self.code
    }

    /// Byte-exact verification of a candidate against this challenge
    pub fn verify(&self, candidate: &str) -> bool {
        self.code.matches(candidate)
    }

    /// Record a failed attempt, returning the new total
    pub fn record_failed_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Failed attempts so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether this challenge has outlived the given time-to-live
    pub fn is_expired(&self, ttl: Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => Utc::now() - self.issued_at > ttl,
            // A TTL too large for chrono means it can never elapse
            Err(_) => false,
        }
    }

    /// Redacted view for display layers (no code)
    pub fn info(&self) -> ChallengeInfo {
        ChallengeInfo {
            recipient: self.recipient.as_str().to_string(),
            display_name: self.display_name.clone(),
            issued_at: self.issued_at,
            attempts: self.attempts,
        }
    }
}

/// What the UI may know about a pending challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeInfo {
    pub recipient: String,
    pub display_name: String,
    pub issued_at: DateTime<Utc>,
    pub attempts: u32,
}
