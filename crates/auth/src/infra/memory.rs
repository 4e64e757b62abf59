//! In-Memory Session Store
//!
//! Keeps the serialized record in memory, mimicking the raw-string
//! semantics of browser local storage: what is stored is text, and
//! text that no longer parses is a corrupt slot, not an error.

use std::sync::Mutex;

use crate::domain::entity::session::Session;
use crate::domain::repository::{SessionStore, StoredSession};
use crate::error::{AuthError, AuthResult};

/// Volatile single-slot store, for tests and demos
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    slot: Mutex<Option<String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put raw text into the slot, bypassing serialization.
    ///
    /// Exists so tests can stage pre-existing or corrupt records.
    pub fn seed_raw(&self, raw: impl Into<String>) {
        *self.slot.lock().expect("session slot lock poisoned") = Some(raw.into());
    }
}

impl SessionStore for InMemorySessionStore {
    async fn save(&self, session: &Session) -> AuthResult<()> {
        let raw = serde_json::to_string(session)
            .map_err(|e| AuthError::Storage(format!("failed to serialize session: {e}")))?;
        *self.slot.lock().expect("session slot lock poisoned") = Some(raw);
        Ok(())
    }

    async fn load(&self) -> AuthResult<StoredSession> {
        let slot = self.slot.lock().expect("session slot lock poisoned");
        match slot.as_deref() {
            None => Ok(StoredSession::Absent),
            Some(raw) => match serde_json::from_str(raw) {
                Ok(session) => Ok(StoredSession::Present(session)),
                Err(_) => Ok(StoredSession::Corrupt),
            },
        }
    }

    async fn clear(&self) -> AuthResult<()> {
        *self.slot.lock().expect("session slot lock poisoned") = None;
        Ok(())
    }
}
