//! Session context: the owned object pages talk to.
//!
//! It wraps the session store, evaluates stored state against the clock, and
//! announces every state change on its bus. Created at process start,
//! `load()`ed once, and reset by `logout()`.
//!
//! Derived state is never trusted from memory: every flag read re-evaluates
//! the store at the current instant, so an expired session is cleared on the
//! first read after its expiry.

use std::sync::Arc;

use thiserror::Error;

use reviso_auth::{
    AuthPhase, CredentialVerifier, EvaluationOutcome, SessionState, SessionUser, StaticCredentials,
    UserProfile, evaluate,
};
use reviso_core::{Clock, DomainError, SystemClock};
use reviso_events::{EventBus, InMemoryEventBus, Subscription};

use crate::storage::StorageError;
use crate::store::{SessionStore, StoreRead};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    /// The initial load finished.
    Loaded,
    LoggedIn,
    ProfileSaved,
    LoggedOut,
    /// A previously valid session was found expired.
    Expired,
    /// Unreadable session data was found and cleared.
    Discarded,
    /// The stored session was changed by someone else sharing the storage.
    Updated,
}

/// Published after every session state change, carrying the resulting phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    pub phase: AuthPhase,
}

#[derive(Debug, Error)]
pub enum SaveProfileError {
    #[error("invalid profile: {0}")]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct SessionContext {
    store: SessionStore,
    clock: Arc<dyn Clock>,
    credentials: Arc<dyn CredentialVerifier>,
    bus: InMemoryEventBus<SessionEvent>,
    state: SessionState,
    loaded: bool,
}

impl core::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionContext")
            .field("store", &self.store)
            .field("state", &self.state)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    pub fn new(
        store: SessionStore,
        clock: Arc<dyn Clock>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            store,
            clock,
            credentials,
            bus: InMemoryEventBus::new(),
            state: SessionState::anonymous(),
            loaded: false,
        }
    }

    /// Wall clock and the built-in credential pair.
    pub fn with_defaults(store: SessionStore) -> Self {
        Self::new(
            store,
            Arc::new(SystemClock),
            Arc::new(StaticCredentials::default()),
        )
    }

    pub fn subscribe(&self) -> Subscription<SessionEvent> {
        self.bus.subscribe()
    }

    // ── Flags (each read re-evaluates the store) ─────────────────────────────

    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn phase(&mut self) -> AuthPhase {
        self.refresh()
    }

    pub fn is_authenticated(&mut self) -> bool {
        self.refresh().is_authenticated()
    }

    pub fn has_completed_onboarding(&mut self) -> bool {
        self.refresh().has_completed_onboarding()
    }

    pub fn user(&mut self) -> Option<&SessionUser> {
        self.refresh();
        self.state.user()
    }

    pub fn user_profile(&mut self) -> Option<&UserProfile> {
        self.refresh();
        self.state.profile()
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Read the store once and leave `Loading`. Later calls are no-ops.
    pub fn load(&mut self) -> AuthPhase {
        if self.loaded {
            tracing::debug!("session already loaded");
            return self.current_phase();
        }

        let (state, _) = self.evaluate_store();
        self.state = state;
        self.loaded = true;

        tracing::info!(phase = %self.current_phase(), "session loaded");
        self.publish(SessionEventKind::Loaded);
        self.current_phase()
    }

    /// Re-evaluate the store at the current instant.
    ///
    /// Before `load()` there is nothing to refresh and the phase stays
    /// `Loading`. A phase change is published with the cause as its kind.
    pub fn refresh(&mut self) -> AuthPhase {
        if !self.loaded {
            return AuthPhase::Loading;
        }

        let before = self.current_phase();
        let (state, outcome) = self.evaluate_store();
        self.state = state;
        let after = self.current_phase();

        if before != after {
            let kind = match outcome {
                EvaluationOutcome::Expired => SessionEventKind::Expired,
                EvaluationOutcome::Malformed => SessionEventKind::Discarded,
                EvaluationOutcome::Absent | EvaluationOutcome::Active => SessionEventKind::Updated,
            };
            tracing::info!(from = %before, to = %after, ?kind, "session changed since last read");
            self.publish(kind);
        }
        after
    }

    /// Check the credentials and, on success, start a new session.
    ///
    /// Returns `false` without touching anything when the pair is rejected
    /// (or when the session could not be persisted).
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        self.ensure_loaded();

        if !self.credentials.verify(username, password) {
            tracing::warn!(username, "login rejected");
            return false;
        }

        let user = SessionUser::new(username);
        let expiry = match self.store.write(&user, self.clock.now()) {
            Ok(expiry) => expiry,
            Err(err) => {
                tracing::error!(error = %err, "failed to persist session");
                return false;
            }
        };

        let profile = self.store.read_profile().filter(|p| p.is_well_formed());
        self.state = SessionState::authenticated(user, profile);

        tracing::info!(username, expires_at = %expiry, phase = %self.current_phase(), "logged in");
        self.publish(SessionEventKind::LoggedIn);
        true
    }

    /// Store the onboarding profile and mark onboarding complete.
    ///
    /// A profile with a blank field is rejected before anything is written.
    /// Saved even while signed out; it is picked up by the next login.
    pub fn save_profile(&mut self, profile: UserProfile) -> Result<(), SaveProfileError> {
        self.ensure_loaded();
        profile.validate()?;
        self.refresh();

        self.store.write_profile(&profile)?;

        if self.state.is_authenticated() {
            self.state = self.state.clone().with_profile(profile);
            tracing::info!(phase = %self.current_phase(), "profile saved");
        } else {
            tracing::debug!("profile saved without an active session");
        }

        self.publish(SessionEventKind::ProfileSaved);
        Ok(())
    }

    /// End the session: wipe the store and return to `Unauthenticated`.
    pub fn logout(&mut self) {
        self.ensure_loaded();

        self.store.clear_quietly();
        let username = self.state.user().map(|u| u.username.clone());
        self.state = SessionState::anonymous();

        tracing::info!(username = username.as_deref().unwrap_or("<none>"), "logged out");
        self.publish(SessionEventKind::LoggedOut);
    }

    fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.load();
        }
    }

    /// Phase of the last evaluation, without touching the store.
    fn current_phase(&self) -> AuthPhase {
        if self.loaded {
            self.state.phase()
        } else {
            AuthPhase::Loading
        }
    }

    fn evaluate_store(&self) -> (SessionState, EvaluationOutcome) {
        let stored = match self.store.read_checked() {
            StoreRead::Found(stored) => stored,
            StoreRead::Empty => return (SessionState::anonymous(), EvaluationOutcome::Absent),
            StoreRead::Discarded => {
                return (SessionState::anonymous(), EvaluationOutcome::Malformed);
            }
        };

        let evaluation = evaluate(Some(&stored), self.clock.now());
        if evaluation.requires_clear() {
            self.store.clear_quietly();
        }
        if evaluation.outcome == EvaluationOutcome::Expired {
            tracing::info!("expired session removed");
        }

        (evaluation.state, evaluation.outcome)
    }

    fn publish(&self, kind: SessionEventKind) {
        let event = SessionEvent {
            kind,
            phase: self.current_phase(),
        };
        if let Err(err) = self.bus.publish(event) {
            tracing::error!(error = ?err, ?kind, "failed to publish session event");
        }
    }
}
