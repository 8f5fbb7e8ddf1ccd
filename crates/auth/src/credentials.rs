//! Credential check behind `login`.
//!
//! There is exactly one accepted credential pair. This is a stand-in for a
//! real identity provider and is kept behind a trait so one can be plugged in
//! without touching the session state machine.

/// Decides whether a username/password pair may sign in.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single fixed credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub const DEFAULT_USERNAME: &'static str = "student";
    pub const DEFAULT_PASSWORD: &'static str = "password123";

    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new(Self::DEFAULT_USERNAME, Self::DEFAULT_PASSWORD)
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}
