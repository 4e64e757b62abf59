//! Federated Provider Handle
//!
//! The real provider integration lives outside this process (the
//! provider's own script on a web surface); here the one-way sign-out
//! hint is acknowledged in the log.

use crate::domain::repository::ProviderHandle;

/// Logs provider hints instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct NoopProviderHandle;

impl ProviderHandle for NoopProviderHandle {
    fn disable_auto_select(&self) {
        tracing::debug!("Instructed identity provider to disable account auto-select");
    }
}
