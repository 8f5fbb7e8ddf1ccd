//! Derived session state and the phases of the session state machine.

use serde::{Deserialize, Serialize};

use crate::{SessionUser, UserProfile};

/// Where a client is in the session lifecycle.
///
/// ```text
/// Loading ──load──▶ Unauthenticated ──login──▶ AuthenticatedNoProfile ──save_profile──▶ AuthenticatedWithProfile
///    │                     ▲                            │                                      │
///    └──load──▶ (either authenticated phase)            └────────── logout / expiry ───────────┘
/// ```
///
/// `Loading` is left exactly once. There is no edge from
/// `AuthenticatedWithProfile` back to `AuthenticatedNoProfile`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Loading,
    Unauthenticated,
    AuthenticatedNoProfile,
    AuthenticatedWithProfile,
}

impl AuthPhase {
    pub fn is_authenticated(self) -> bool {
        matches!(
            self,
            AuthPhase::AuthenticatedNoProfile | AuthPhase::AuthenticatedWithProfile
        )
    }

    pub fn has_completed_onboarding(self) -> bool {
        self == AuthPhase::AuthenticatedWithProfile
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthPhase::Loading => "loading",
            AuthPhase::Unauthenticated => "unauthenticated",
            AuthPhase::AuthenticatedNoProfile => "authenticated_no_profile",
            AuthPhase::AuthenticatedWithProfile => "authenticated_with_profile",
        }
    }
}

impl core::fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived state: who is signed in and which profile they completed.
///
/// Never persisted. A profile without a user is not representable through the
/// constructors, so `has_completed_onboarding ⇒ is_authenticated` holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    user: Option<SessionUser>,
    profile: Option<UserProfile>,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: SessionUser, profile: Option<UserProfile>) -> Self {
        Self {
            user: Some(user),
            profile,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.is_authenticated() && self.profile.is_some()
    }

    /// Attach a profile. Ignored while signed out.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        if self.is_authenticated() {
            self.profile = Some(profile);
        }
        self
    }

    pub fn phase(&self) -> AuthPhase {
        match (&self.user, &self.profile) {
            (None, _) => AuthPhase::Unauthenticated,
            (Some(_), None) => AuthPhase::AuthenticatedNoProfile,
            (Some(_), Some(_)) => AuthPhase::AuthenticatedWithProfile,
        }
    }
}
