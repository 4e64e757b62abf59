//! JSON File Session Store
//!
//! Durable single-slot persistence: one JSON file named after the
//! configured storage key. The desktop/CLI analog of the browser
//! local-storage entry the original design persisted into.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::entity::session::Session;
use crate::domain::repository::{SessionStore, StoredSession};
use crate::error::{AuthError, AuthResult};

/// File-backed single-slot store
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    /// Store under `<dir>/<storage_key>.json`
    pub fn new(dir: impl Into<PathBuf>, storage_key: &str) -> Self {
        Self {
            path: dir.into().join(format!("{storage_key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileSessionStore {
    async fn save(&self, session: &Session) -> AuthResult<()> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| AuthError::Storage(format!("failed to serialize session: {e}")))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AuthError::Storage(format!("failed to create store dir: {e}")))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| AuthError::Storage(format!("failed to write session slot: {e}")))
    }

    async fn load(&self) -> AuthResult<StoredSession> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(session) => Ok(StoredSession::Present(session)),
                Err(e) => {
                    tracing::debug!(path = %self.path.display(), error = %e, "Session slot unreadable");
                    Ok(StoredSession::Corrupt)
                }
            },
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(StoredSession::Absent),
            Err(e) => Err(AuthError::Storage(format!(
                "failed to read session slot: {e}"
            ))),
        }
    }

    async fn clear(&self) -> AuthResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Storage(format!(
                "failed to clear session slot: {e}"
            ))),
        }
    }
}
