//! Session store: the single owner of the persisted session keys.
//!
//! Three string values live under a namespaced prefix:
//!
//! | key | value |
//! |---|---|
//! | `{ns}.session.user` | JSON `{"username": ...}` |
//! | `{ns}.session.expiry` | decimal epoch milliseconds |
//! | `{ns}.session.profile` | JSON `{name, institution, program, term}` |
//!
//! Reads never fail outward. Anything that cannot be read or decoded wipes the
//! whole session so the user is asked to sign in again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

use reviso_auth::{SessionExpiry, SessionUser, StoredSession, UserProfile};

use crate::storage::{KeyValueStorage, StorageError};

/// Fully qualified storage keys for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    pub user: String,
    pub expiry: String,
    pub profile: String,
}

impl SessionKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            user: format!("{namespace}.session.user"),
            expiry: format!("{namespace}.session.expiry"),
            profile: format!("{namespace}.session.profile"),
        }
    }

    fn all(&self) -> [&str; 3] {
        [&self.user, &self.expiry, &self.profile]
    }
}

/// Why stored session data could not be read back.
#[derive(Debug, Error)]
enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("malformed stored {what}: {source}")]
    Decode {
        what: &'static str,
        source: serde_json::Error,
    },
}

/// A read with the fail-closed policy already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreRead {
    Empty,
    Found(StoredSession),
    /// Unreadable data was found and the session was cleared.
    Discarded,
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    keys: SessionKeys,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore").field("keys", &self.keys).finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, namespace: &str) -> Self {
        Self {
            storage,
            keys: SessionKeys::new(namespace),
        }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Persist a freshly signed-in user with expiry `now + TTL`.
    pub fn write(&self, user: &SessionUser, now: DateTime<Utc>) -> Result<SessionExpiry, StorageError> {
        let expiry = SessionExpiry::after_login(now);
        let user_json = encode(user)?;
        let expiry_raw = expiry.to_storage_string();

        self.storage.set_all(&[
            (self.keys.user.as_str(), user_json.as_str()),
            (self.keys.expiry.as_str(), expiry_raw.as_str()),
        ])?;

        Ok(expiry)
    }

    /// Persist the onboarding profile. Expiry is untouched.
    pub fn write_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let profile_json = encode(profile)?;
        self.storage.set(&self.keys.profile, &profile_json)
    }

    /// Read everything stored for this namespace.
    ///
    /// `None` when nothing is stored, or when anything failed to read or
    /// decode; in the latter case the whole session has been cleared.
    pub fn read(&self) -> Option<StoredSession> {
        match self.read_checked() {
            StoreRead::Found(stored) => Some(stored),
            StoreRead::Empty | StoreRead::Discarded => None,
        }
    }

    pub(crate) fn read_checked(&self) -> StoreRead {
        match self.try_read() {
            Ok(Some(stored)) => StoreRead::Found(stored),
            Ok(None) => StoreRead::Empty,
            Err(err) => {
                tracing::warn!(error = %err, "clearing unreadable session data");
                self.clear_quietly();
                StoreRead::Discarded
            }
        }
    }

    /// Read just the profile (used when signing in on top of an existing one).
    ///
    /// An undecodable profile is removed and reported as absent.
    pub fn read_profile(&self) -> Option<UserProfile> {
        let raw = match self.storage.get(&self.keys.profile) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::error!(error = %err, "failed to read stored profile");
                return None;
            }
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) => Some(profile),
            Err(err) => {
                tracing::warn!(error = %err, "discarding undecodable profile");
                if let Err(err) = self.storage.remove_all(&[self.keys.profile.as_str()]) {
                    tracing::error!(error = %err, "failed to remove undecodable profile");
                }
                None
            }
        }
    }

    /// Remove all three session keys in one step.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_all(&self.keys.all())
    }

    pub(crate) fn clear_quietly(&self) {
        if let Err(err) = self.clear() {
            tracing::error!(error = %err, "failed to clear session storage");
        }
    }

    fn try_read(&self) -> Result<Option<StoredSession>, ReadError> {
        let user = self.storage.get(&self.keys.user)?;
        let expiry = self.storage.get(&self.keys.expiry)?;
        let profile = self.storage.get(&self.keys.profile)?;

        if user.is_none() && expiry.is_none() && profile.is_none() {
            return Ok(None);
        }

        Ok(Some(StoredSession {
            user: user.map(|raw| decode::<SessionUser>(&raw, "user")).transpose()?,
            expiry,
            profile: profile.map(|raw| decode::<UserProfile>(&raw, "profile")).transpose()?,
        }))
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value)
        .map_err(|err| StorageError::Backend(format!("failed to encode session value: {err}")))
}

fn decode<T: DeserializeOwned>(raw: &str, what: &'static str) -> Result<T, ReadError> {
    serde_json::from_str(raw).map_err(|source| ReadError::Decode { what, source })
}
