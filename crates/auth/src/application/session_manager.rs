//! Session Manager - the authentication state machine
//!
//! The single source of truth for "is a user signed in". Raw credential
//! events (a federated token, a requested/sent/entered OTP) come in;
//! committed, persisted sessions come out.
//!
//! The scattered per-flow flags a UI would otherwise carry collapse
//! into one state value, one optional pending challenge, and one
//! current-error slot, so combinatorially-invalid flag mixes cannot be
//! represented.

use std::sync::Arc;

use derive_more::Display;

use crate::application::config::AuthConfig;
use crate::domain::credential;
use crate::domain::entity::{
    otp_challenge::{ChallengeInfo, OtpChallenge},
    session::Session,
};
use crate::domain::repository::{
    DeliveryOutcome, OtpDelivery, ProviderHandle, SessionStore, StoredSession,
};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Authentication states
///
/// `AuthenticatingFederated` only exists inside a `handle_credential`
/// call; observers see one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AuthState {
    /// No session; default state
    #[display("signed_out")]
    SignedOut,
    /// A federated credential is being decoded (transient)
    #[display("authenticating_federated")]
    AuthenticatingFederated,
    /// A challenge was issued and awaits verification
    #[display("awaiting_otp")]
    AwaitingOtp,
    /// A session exists
    #[display("signed_in")]
    SignedIn,
}

/// The authentication session state machine.
///
/// Single-instance, event-driven: every transition is a `&mut self`
/// method triggered by a discrete external event, so transitions are
/// serialized by ownership. Store writes happen only on entry to
/// `SignedIn` and on sign-out from `SignedIn`.
pub struct SessionManager<S, D, P>
where
    S: SessionStore,
    D: OtpDelivery,
    P: ProviderHandle,
{
    store: Arc<S>,
    delivery: Arc<D>,
    provider: Arc<P>,
    config: Arc<AuthConfig>,

    state: AuthState,
    session: Option<Session>,
    pending: Option<OtpChallenge>,
    last_delivery: Option<DeliveryOutcome>,
    current_error: Option<AuthError>,
}

impl<S, D, P> SessionManager<S, D, P>
where
    S: SessionStore,
    D: OtpDelivery,
    P: ProviderHandle,
{
    pub fn new(store: Arc<S>, delivery: Arc<D>, provider: Arc<P>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            delivery,
            provider,
            config,
            state: AuthState::SignedOut,
            session: None,
            pending: None,
            last_delivery: None,
            current_error: None,
        }
    }

    // ========================================================================
    // Startup
    // ========================================================================

    /// Reconstruct state from the session store.
    ///
    /// A persisted record is trusted as-is and transitions straight to
    /// `SignedIn` without re-running credential or OTP validation. Any
    /// storage trouble - a corrupt record included - downgrades to
    /// `SignedOut` silently; startup never surfaces a user-facing
    /// error.
    pub async fn restore(&mut self) -> AuthState {
        match self.store.load().await {
            Ok(StoredSession::Present(session)) => {
                tracing::info!(session_id = %session.id, "Restored persisted session");
                self.session = Some(session);
                self.state = AuthState::SignedIn;
            }
            Ok(StoredSession::Absent) => {
                self.state = AuthState::SignedOut;
            }
            Ok(StoredSession::Corrupt) => {
                tracing::warn!("Persisted session is unreadable, clearing the slot");
                if let Err(err) = self.store.clear().await {
                    err.log();
                }
                self.state = AuthState::SignedOut;
            }
            Err(err) => {
                err.log();
                self.state = AuthState::SignedOut;
            }
        }
        self.state
    }

    // ========================================================================
    // User actions
    // ========================================================================

    /// Federated credential received from the provider callback.
    ///
    /// On successful decode the claim is materialized as a session and
    /// committed, discarding any pending OTP challenge. A decode
    /// failure returns to the state the attempt started from
    /// (`AwaitingOtp` while a challenge is pending, `SignedOut`
    /// otherwise); the federated attempt itself is not retriable and
    /// must be restarted from scratch.
    pub async fn handle_credential(&mut self, raw_token: &str) -> AuthResult<&Session> {
        self.begin_action();

        if self.state == AuthState::SignedIn {
            return Err(self.record_error(AuthError::AlreadySignedIn));
        }

        self.state = AuthState::AuthenticatingFederated;

        match credential::decode(raw_token) {
            Ok(claim) => {
                tracing::debug!(subject_id = %claim.subject_id, "Decoded federated credential");
                self.commit_session(Session::from_claim(claim)).await
            }
            Err(err) => {
                // Fall back to where the attempt started: a pending
                // challenge means the OTP flow is still live
                self.state = if self.pending.is_some() {
                    AuthState::AwaitingOtp
                } else {
                    AuthState::SignedOut
                };
                Err(self.record_error(err))
            }
        }
    }

    /// User requested an OTP sign-in with an email and display name.
    ///
    /// Issues a fresh challenge - unconditionally replacing any pending
    /// one, which is the last-issued-wins race guarantee - and hands it
    /// to the delivery adapter. On delivery failure the state stays
    /// `AwaitingOtp` with the challenge intact: the user may retry the
    /// send by calling this again.
    pub async fn request_code(
        &mut self,
        email: &str,
        display_name: &str,
    ) -> AuthResult<DeliveryOutcome> {
        self.begin_action();

        if self.state == AuthState::SignedIn {
            return Err(self.record_error(AuthError::AlreadySignedIn));
        }

        let recipient = match Email::new(email) {
            Ok(recipient) => recipient,
            Err(err) => return Err(self.record_error(err.into())),
        };

        self.pending = Some(OtpChallenge::issue(recipient, display_name));
        self.state = AuthState::AwaitingOtp;
        self.last_delivery = None;

        let result = match self.pending.as_ref() {
            Some(challenge) => self.delivery.send(challenge).await,
            None => Err(AuthError::Internal(
                "pending challenge missing after issuance".into(),
            )),
        };

        match result {
            Ok(outcome) => {
                tracing::info!(recipient = email, outcome = ?outcome, "Verification code sent");
                self.last_delivery = Some(outcome);
                Ok(outcome)
            }
            Err(err) => Err(self.record_error(err)),
        }
    }

    /// User submitted a candidate code.
    ///
    /// A byte-exact match consumes the challenge and commits a
    /// synthesized session. A mismatch keeps the challenge so the same
    /// correct code still succeeds on a later attempt.
    pub async fn submit_code(&mut self, candidate: &str) -> AuthResult<&Session> {
        self.begin_action();

        // Submission is only valid mid-flow: the state gate and the
        // pending slot must agree before a code is even looked at
        if self.state != AuthState::AwaitingOtp || self.pending.is_none() {
            return Err(self.record_error(AuthError::NoPendingChallenge));
        }

        let expired = match (self.config.otp_ttl, self.pending.as_ref()) {
            (Some(ttl), Some(challenge)) => challenge.is_expired(ttl),
            _ => false,
        };
        if expired {
            self.pending = None;
            self.state = AuthState::SignedOut;
            return Err(self.record_error(AuthError::ChallengeExpired));
        }

        let verified = self
            .pending
            .as_ref()
            .is_some_and(|challenge| challenge.verify(candidate));

        if verified {
            // Write-once-read-once: a matched challenge is consumed
            let challenge = match self.pending.take() {
                Some(challenge) => challenge,
                None => {
                    return Err(self.record_error(AuthError::Internal(
                        "pending challenge missing after verification".into(),
                    )));
                }
            };
            let session = Session::from_verified_otp(&challenge.recipient, &challenge.display_name);
            self.commit_session(session).await
        } else {
            let attempts = self
                .pending
                .as_mut()
                .map(OtpChallenge::record_failed_attempt)
                .unwrap_or(0);

            if let Some(cap) = self.config.max_verify_attempts {
                if attempts >= cap {
                    self.pending = None;
                    self.state = AuthState::SignedOut;
                    return Err(self.record_error(AuthError::TooManyAttempts));
                }
            }

            Err(self.record_error(AuthError::CodeMismatch))
        }
    }

    /// User closed the verification flow; discard all pending OTP state.
    pub fn cancel_otp(&mut self) {
        self.begin_action();

        if self.state == AuthState::AwaitingOtp {
            tracing::debug!("Verification flow cancelled");
            self.pending = None;
            self.last_delivery = None;
            self.state = AuthState::SignedOut;
        }
    }

    /// Explicit sign-out.
    ///
    /// Clears the session from memory and from the store, and fires
    /// the provider's disable-auto-select hint so the account is not
    /// auto-selected on the next load. Idempotent from any state.
    pub async fn sign_out(&mut self) -> AuthResult<()> {
        self.begin_action();

        let was_signed_in = self.session.take().is_some();
        self.pending = None;
        self.last_delivery = None;
        self.state = AuthState::SignedOut;

        if was_signed_in {
            self.provider.disable_auto_select();
            if let Err(err) = self.store.clear().await {
                return Err(self.record_error(err));
            }
            tracing::info!("User signed out");
        }

        Ok(())
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Current state
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// The committed session, if signed in
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a session exists
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Redacted view of the pending challenge for display layers
    pub fn pending_challenge(&self) -> Option<ChallengeInfo> {
        self.pending.as_ref().map(OtpChallenge::info)
    }

    /// How far the last successful delivery got
    pub fn last_delivery(&self) -> Option<DeliveryOutcome> {
        self.last_delivery
    }

    /// The most recent error, if the last user action failed
    pub fn current_error(&self) -> Option<&AuthError> {
        self.current_error.as_ref()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Every user action starts by clearing the error slot
    fn begin_action(&mut self) {
        self.current_error = None;
    }

    /// Record the error in the current-error slot and hand it back
    fn record_error(&mut self, err: AuthError) -> AuthError {
        err.log();
        self.current_error = Some(err.clone());
        err
    }

    /// Commit a session: persist, replace, enter `SignedIn`.
    ///
    /// Persistence failure costs restart continuity, not the sign-in
    /// itself; it is logged and the in-memory session stands.
    async fn commit_session(&mut self, session: Session) -> AuthResult<&Session> {
        if let Err(err) = self.store.save(&session).await {
            err.log();
        }

        tracing::info!(session_id = %session.id, email = %session.email, "Session committed");

        self.pending = None;
        self.last_delivery = None;
        self.state = AuthState::SignedIn;
        Ok(&*self.session.insert(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemorySessionStore;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Captures what was handed to the transport, with a switchable
    /// outage mode
    #[derive(Default)]
    struct RecordingDelivery {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: AtomicBool,
    }

    impl RecordingDelivery {
        fn last_code(&self) -> String {
            self.sent.lock().unwrap().last().unwrap().2.clone()
        }

        fn set_failing(&self, failing: bool) {
            self.fail.store(failing, Ordering::SeqCst);
        }
    }

    impl OtpDelivery for RecordingDelivery {
        async fn send(&self, challenge: &OtpChallenge) -> AuthResult<DeliveryOutcome> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AuthError::Delivery("simulated outage".into()));
            }
            self.sent.lock().unwrap().push((
                challenge.recipient.as_str().to_string(),
                challenge.display_name.clone(),
                challenge.code().as_str().to_string(),
            ));
            Ok(DeliveryOutcome::Submitted)
        }
    }

    /// Counts disable-auto-select hints
    #[derive(Default)]
    struct CountingProvider {
        hints: AtomicU32,
    }

    impl ProviderHandle for CountingProvider {
        fn disable_auto_select(&self) {
            self.hints.fetch_add(1, Ordering::SeqCst);
        }
    }

    type TestManager = SessionManager<InMemorySessionStore, RecordingDelivery, CountingProvider>;

    struct Fixture {
        store: Arc<InMemorySessionStore>,
        delivery: Arc<RecordingDelivery>,
        provider: Arc<CountingProvider>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: Arc::new(InMemorySessionStore::new()),
                delivery: Arc::new(RecordingDelivery::default()),
                provider: Arc::new(CountingProvider::default()),
            }
        }

        fn manager(&self) -> TestManager {
            self.manager_with(AuthConfig::default())
        }

        fn manager_with(&self, config: AuthConfig) -> TestManager {
            SessionManager::new(
                Arc::clone(&self.store),
                Arc::clone(&self.delivery),
                Arc::clone(&self.provider),
                Arc::new(config),
            )
        }
    }

    fn valid_token() -> String {
        format!(
            "eyJhbGciOiJSUzI1NiJ9.{}.c2ln",
            URL_SAFE_NO_PAD.encode(r#"{"sub":"u1","name":"A","email":"a@x.com","picture":"p"}"#)
        )
    }

    #[tokio::test]
    async fn test_federated_sign_in_commits_exact_session() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        let session = manager.handle_credential(&valid_token()).await.unwrap();
        assert_eq!(session.id, "u1");
        assert_eq!(session.name, "A");
        assert_eq!(session.email, "a@x.com");
        assert_eq!(session.avatar_url, "p");

        assert_eq!(manager.state(), AuthState::SignedIn);
        assert!(matches!(
            fixture.store.load().await.unwrap(),
            StoredSession::Present(_)
        ));
    }

    #[tokio::test]
    async fn test_malformed_tokens_leave_signed_out() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        for raw in [
            "onlyonesegment",
            "two.segments",
            "header.!!notbase64!!.sig",
            &format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json")),
        ] {
            let err = manager.handle_credential(raw).await.unwrap_err();
            assert!(matches!(err, AuthError::CredentialDecode(_)));
            assert_eq!(manager.state(), AuthState::SignedOut);
            assert!(matches!(
                manager.current_error(),
                Some(AuthError::CredentialDecode(_))
            ));
        }

        assert_eq!(fixture.store.load().await.unwrap(), StoredSession::Absent);
    }

    #[tokio::test]
    async fn test_otp_round_trip() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        let outcome = manager.request_code("b@y.com", "Bob").await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::Submitted);
        assert_eq!(manager.state(), AuthState::AwaitingOtp);

        let code = fixture.delivery.last_code();
        let session = manager.submit_code(&code).await.unwrap();
        assert_eq!(session.email, "b@y.com");
        assert_eq!(session.name, "Bob");
        assert!(session.id.starts_with("email-"));
        assert_eq!(manager.state(), AuthState::SignedIn);
    }

    #[tokio::test]
    async fn test_mismatch_keeps_challenge_for_retry() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        manager.request_code("b@y.com", "Bob").await.unwrap();
        let code = fixture.delivery.last_code();

        let err = manager.submit_code("000000").await.unwrap_err();
        assert!(matches!(err, AuthError::CodeMismatch));
        assert_eq!(manager.state(), AuthState::AwaitingOtp);
        assert_eq!(manager.pending_challenge().unwrap().attempts, 1);

        // Same correct code still succeeds
        assert!(manager.submit_code(&code).await.is_ok());
        assert_eq!(manager.state(), AuthState::SignedIn);
    }

    #[tokio::test]
    async fn test_reissue_invalidates_prior_challenge() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        manager.request_code("b@y.com", "Bob").await.unwrap();
        let first_code = fixture.delivery.last_code();

        manager.request_code("b@y.com", "Bob").await.unwrap();
        let second_code = fixture.delivery.last_code();

        if first_code != second_code {
            let err = manager.submit_code(&first_code).await.unwrap_err();
            assert!(matches!(err, AuthError::CodeMismatch));
        }
        assert!(manager.submit_code(&second_code).await.is_ok());
    }

    #[tokio::test]
    async fn test_delivery_failure_stays_reissuable() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        fixture.delivery.set_failing(true);
        let err = manager.request_code("b@y.com", "Bob").await.unwrap_err();
        assert!(matches!(err, AuthError::Delivery(_)));
        assert_eq!(manager.state(), AuthState::AwaitingOtp);
        assert!(manager.pending_challenge().is_some());
        assert!(manager.last_delivery().is_none());

        // Retrying the send re-issues and succeeds
        fixture.delivery.set_failing(false);
        manager.request_code("b@y.com", "Bob").await.unwrap();
        let code = fixture.delivery.last_code();
        assert!(manager.submit_code(&code).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_federated_decode_keeps_otp_flow_live() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        manager.request_code("b@y.com", "Bob").await.unwrap();
        let code = fixture.delivery.last_code();

        // A garbage federated token mid-flow must not strand the
        // challenge in a signed-out state
        let err = manager.handle_credential("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::CredentialDecode(_)));
        assert_eq!(manager.state(), AuthState::AwaitingOtp);
        assert!(manager.pending_challenge().is_some());

        // The still-pending challenge remains verifiable
        let session = manager.submit_code(&code).await.unwrap();
        assert_eq!(session.email, "b@y.com");
        assert_eq!(manager.state(), AuthState::SignedIn);
    }

    #[tokio::test]
    async fn test_federated_commit_discards_pending_challenge() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        manager.request_code("b@y.com", "Bob").await.unwrap();
        let code = fixture.delivery.last_code();

        // The interchangeable paths are last-one-wins: a federated
        // commit consumes the OTP flow entirely
        manager.handle_credential(&valid_token()).await.unwrap();
        assert_eq!(manager.state(), AuthState::SignedIn);
        assert!(manager.pending_challenge().is_none());

        manager.sign_out().await.unwrap();
        let err = manager.submit_code(&code).await.unwrap_err();
        assert!(matches!(err, AuthError::NoPendingChallenge));
        assert_eq!(manager.state(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_submit_without_challenge_fails() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        let err = manager.submit_code("123456").await.unwrap_err();
        assert!(matches!(err, AuthError::NoPendingChallenge));
        assert_eq!(manager.state(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        let err = manager.request_code("not-an-email", "Bob").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(manager.state(), AuthState::SignedOut);
        assert!(manager.pending_challenge().is_none());
    }

    #[tokio::test]
    async fn test_restore_reproduces_persisted_session() {
        let fixture = Fixture::new();

        let mut manager = fixture.manager();
        let committed = manager.handle_credential(&valid_token()).await.unwrap().clone();

        // Fresh manager over the same store simulates a process restart
        let mut restarted = fixture.manager();
        assert_eq!(restarted.restore().await, AuthState::SignedIn);
        assert_eq!(restarted.session(), Some(&committed));
    }

    #[tokio::test]
    async fn test_restore_clears_corrupt_slot() {
        let fixture = Fixture::new();
        fixture.store.seed_raw("{not json at all");

        let mut manager = fixture.manager();
        assert_eq!(manager.restore().await, AuthState::SignedOut);
        assert!(manager.current_error().is_none());
        assert_eq!(fixture.store.load().await.unwrap(), StoredSession::Absent);
    }

    #[tokio::test]
    async fn test_restore_rejects_schema_invalid_record() {
        let fixture = Fixture::new();
        fixture.store.seed_raw(r#"{"unexpected":"shape"}"#);

        let mut manager = fixture.manager();
        assert_eq!(manager.restore().await, AuthState::SignedOut);
        assert_eq!(fixture.store.load().await.unwrap(), StoredSession::Absent);
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        manager.handle_credential(&valid_token()).await.unwrap();
        manager.sign_out().await.unwrap();

        assert_eq!(manager.state(), AuthState::SignedOut);
        assert!(manager.session().is_none());
        assert_eq!(fixture.store.load().await.unwrap(), StoredSession::Absent);
        assert_eq!(fixture.provider.hints.load(Ordering::SeqCst), 1);

        // Signing out again is a no-op, no second provider hint
        manager.sign_out().await.unwrap();
        assert_eq!(fixture.provider.hints.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_discards_pending_otp_state() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        manager.request_code("b@y.com", "Bob").await.unwrap();
        let code = fixture.delivery.last_code();

        manager.cancel_otp();
        assert_eq!(manager.state(), AuthState::SignedOut);
        assert!(manager.pending_challenge().is_none());

        let err = manager.submit_code(&code).await.unwrap_err();
        assert!(matches!(err, AuthError::NoPendingChallenge));
    }

    #[tokio::test]
    async fn test_error_slot_cleared_on_next_action() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        manager.handle_credential("garbage").await.unwrap_err();
        assert!(manager.current_error().is_some());

        manager.request_code("b@y.com", "Bob").await.unwrap();
        assert!(manager.current_error().is_none());
    }

    #[tokio::test]
    async fn test_attempt_cap_discards_challenge() {
        let fixture = Fixture::new();
        let config = AuthConfig {
            max_verify_attempts: Some(2),
            ..Default::default()
        };
        let mut manager = fixture.manager_with(config);

        manager.request_code("b@y.com", "Bob").await.unwrap();
        let code = fixture.delivery.last_code();

        assert!(matches!(
            manager.submit_code("000000").await.unwrap_err(),
            AuthError::CodeMismatch
        ));
        assert!(matches!(
            manager.submit_code("000001").await.unwrap_err(),
            AuthError::TooManyAttempts
        ));
        assert_eq!(manager.state(), AuthState::SignedOut);

        // The correct code is useless once the budget is spent
        assert!(matches!(
            manager.submit_code(&code).await.unwrap_err(),
            AuthError::NoPendingChallenge
        ));
    }

    #[tokio::test]
    async fn test_challenge_ttl_expires() {
        let fixture = Fixture::new();
        let config = AuthConfig {
            otp_ttl: Some(std::time::Duration::from_nanos(1)),
            ..Default::default()
        };
        let mut manager = fixture.manager_with(config);

        manager.request_code("b@y.com", "Bob").await.unwrap();
        let code = fixture.delivery.last_code();

        std::thread::sleep(std::time::Duration::from_millis(5));

        let err = manager.submit_code(&code).await.unwrap_err();
        assert!(matches!(err, AuthError::ChallengeExpired));
        assert_eq!(manager.state(), AuthState::SignedOut);
        assert!(manager.pending_challenge().is_none());
    }

    #[tokio::test]
    async fn test_delivery_receives_routing_values() {
        let fixture = Fixture::new();
        let mut manager = fixture.manager();

        manager.request_code("B@Y.com", "Bob").await.unwrap();

        let sent = fixture.delivery.sent.lock().unwrap();
        let (recipient, name, code) = sent.last().unwrap();
        assert_eq!(recipient, "b@y.com"); // normalized by the Email VO
        assert_eq!(name, "Bob");
        assert_eq!(code.len(), 6);
    }
}
