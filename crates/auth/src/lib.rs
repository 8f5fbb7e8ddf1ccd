//! `reviso-auth` — pure session domain.
//!
//! Records, expiry rules, the credential check and the evaluator that turns
//! stored values plus "now" into derived session state. No storage, no IO.

pub mod credentials;
pub mod evaluator;
pub mod profile;
pub mod session;
pub mod state;

pub use credentials::{CredentialVerifier, StaticCredentials};
pub use evaluator::{Evaluation, EvaluationOutcome, StoredSession, evaluate};
pub use profile::UserProfile;
pub use session::{ExpiryError, SESSION_TTL_DAYS, SessionExpiry, SessionUser, session_ttl};
pub use state::{AuthPhase, SessionState};
