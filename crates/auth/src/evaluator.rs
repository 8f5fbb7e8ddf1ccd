//! Session evaluation: stored values + now → derived state.
//!
//! - No IO
//! - No panics
//! - Never returns an error: anything unreadable degrades to "signed out"

use chrono::{DateTime, Utc};

use crate::{ExpiryError, SessionExpiry, SessionState, SessionUser, UserProfile};

/// Values as read back from the session store.
///
/// The user and profile have already been decoded by the store; the expiry is
/// kept as the raw persisted string and parsed here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    pub user: Option<SessionUser>,
    pub expiry: Option<String>,
    pub profile: Option<UserProfile>,
}

/// Why the evaluator reached its verdict.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// Nothing usable was stored.
    Absent,
    /// A session is stored and still valid.
    Active,
    /// The stored session reached its expiry.
    Expired,
    /// The stored session is incomplete or its expiry could not be parsed.
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub state: SessionState,
    pub outcome: EvaluationOutcome,
}

impl Evaluation {
    fn signed_out(outcome: EvaluationOutcome) -> Self {
        Self {
            state: SessionState::anonymous(),
            outcome,
        }
    }

    /// Expired or unreadable sessions must be removed from the store eagerly.
    pub fn requires_clear(&self) -> bool {
        matches!(
            self.outcome,
            EvaluationOutcome::Expired | EvaluationOutcome::Malformed
        )
    }
}

/// Derive session state from what the store holds at `now`.
pub fn evaluate(stored: Option<&StoredSession>, now: DateTime<Utc>) -> Evaluation {
    let Some(stored) = stored else {
        return Evaluation::signed_out(EvaluationOutcome::Absent);
    };
    let (user, raw_expiry) = match (&stored.user, &stored.expiry) {
        (Some(user), Some(raw_expiry)) => (user, raw_expiry),
        // A profile on its own is kept for the next login.
        (None, None) => return Evaluation::signed_out(EvaluationOutcome::Absent),
        (user, _) => {
            tracing::warn!(
                has_user = user.is_some(),
                "discarding session with only one of user and expiry"
            );
            return Evaluation::signed_out(EvaluationOutcome::Malformed);
        }
    };

    let expiry = match SessionExpiry::parse(raw_expiry) {
        Ok(expiry) => expiry,
        Err(err) => {
            tracing::warn!(error = %err, "discarding session with unreadable expiry");
            return Evaluation::signed_out(EvaluationOutcome::Malformed);
        }
    };

    if let Err(ExpiryError::Expired) = expiry.validate(now) {
        tracing::info!(username = %user.username, expired_at = %expiry, "session expired");
        return Evaluation::signed_out(EvaluationOutcome::Expired);
    }

    let profile = stored
        .profile
        .as_ref()
        .filter(|profile| profile.is_well_formed())
        .cloned();

    Evaluation {
        state: SessionState::authenticated(user.clone(), profile),
        outcome: EvaluationOutcome::Active,
    }
}
