use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use reviso_core::ValueObject;

/// Sessions live for a fixed number of days after login.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Fixed session lifetime. Activity never extends it.
pub fn session_ttl() -> Duration {
    Duration::days(SESSION_TTL_DAYS)
}

/// The identity held by an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
}

impl SessionUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl ValueObject for SessionUser {}

/// Absolute session expiry, in epoch milliseconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionExpiry(i64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpiryError {
    #[error("malformed session expiry: {0:?}")]
    Malformed(String),

    #[error("session has expired")]
    Expired,
}

impl SessionExpiry {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Expiry for a login that happened at `logged_in_at`.
    pub fn after_login(logged_in_at: DateTime<Utc>) -> Self {
        Self((logged_in_at + session_ttl()).timestamp_millis())
    }

    /// Parse the persisted decimal representation.
    pub fn parse(raw: &str) -> Result<Self, ExpiryError> {
        raw.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ExpiryError::Malformed(raw.to_string()))
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Decimal string written to storage.
    pub fn to_storage_string(&self) -> String {
        self.0.to_string()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.0
    }

    /// The session is valid strictly before its expiry instant.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ExpiryError> {
        if self.is_expired_at(now) {
            return Err(ExpiryError::Expired);
        }
        Ok(())
    }
}

impl core::fmt::Display for SessionExpiry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match DateTime::from_timestamp_millis(self.0) {
            Some(at) => write!(f, "{}", at.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn expiry_is_seven_days_after_login() {
        let login = at(1_700_000_000_000);
        let expiry = SessionExpiry::after_login(login);
        assert_eq!(expiry.as_millis(), 1_700_000_000_000 + 7 * 24 * 60 * 60 * 1000);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let expiry = SessionExpiry::from_millis(10_000);
        assert!(expiry.validate(at(9_999)).is_ok());
        assert_eq!(expiry.validate(at(10_000)), Err(ExpiryError::Expired));
        assert_eq!(expiry.validate(at(10_001)), Err(ExpiryError::Expired));
    }

    #[test]
    fn parse_accepts_decimal_millis() {
        assert_eq!(SessionExpiry::parse("1712345678901").unwrap().as_millis(), 1_712_345_678_901);
        assert_eq!(SessionExpiry::parse(" 42 \n").unwrap().as_millis(), 42);
    }

    #[test]
    fn parse_rejects_garbage() {
        for raw in ["", "soon", "12.5", "0x10", "99999999999999999999999"] {
            assert!(
                matches!(SessionExpiry::parse(raw), Err(ExpiryError::Malformed(_))),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn storage_string_parses_back() {
        let expiry = SessionExpiry::after_login(at(5));
        assert_eq!(SessionExpiry::parse(&expiry.to_storage_string()).unwrap(), expiry);
    }

    #[test]
    fn session_user_json_layout() {
        let json = serde_json::to_string(&SessionUser::new("student")).unwrap();
        assert_eq!(json, r#"{"username":"student"}"#);
    }
}
