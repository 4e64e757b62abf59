//! Application Configuration
//!
//! Configuration for the auth application layer.

use std::time::Duration;

/// Auth application configuration
///
/// The OTP hardening knobs (`otp_ttl`, `max_verify_attempts`) are
/// opt-in and default to `None`: the baseline contract never expires a
/// pending challenge and never locks out after failed attempts.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Well-known key naming the single persistence slot
    pub storage_key: String,
    /// Time-to-live for a pending challenge, if enforced
    pub otp_ttl: Option<Duration>,
    /// Failed verification attempts allowed per challenge, if capped
    pub max_verify_attempts: Option<u32>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            storage_key: "auth_session".to_string(),
            otp_ttl: None,
            max_verify_attempts: None,
        }
    }
}

impl AuthConfig {
    /// Config with challenge expiry and an attempt cap enabled
    pub fn hardened() -> Self {
        Self {
            otp_ttl: Some(Duration::from_secs(10 * 60)),
            max_verify_attempts: Some(5),
            ..Default::default()
        }
    }
}
