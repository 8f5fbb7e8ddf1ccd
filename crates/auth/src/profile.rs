//! Onboarding profile.

use serde::{Deserialize, Serialize};

use reviso_core::{DomainError, DomainResult, ValueObject};

/// The profile collected by the one-time onboarding form.
///
/// # Invariants
/// - All four fields are present together; there is no partial profile.
/// - No field is blank.
///
/// `college` and `semester` are accepted when deserializing so profiles
/// written under the earlier field names still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(alias = "college")]
    pub institution: String,
    pub program: String,
    #[serde(alias = "semester")]
    pub term: String,
}

impl ValueObject for UserProfile {}

impl UserProfile {
    /// Build a validated profile. Fields are trimmed.
    pub fn new(
        name: impl Into<String>,
        institution: impl Into<String>,
        program: impl Into<String>,
        term: impl Into<String>,
    ) -> DomainResult<Self> {
        let profile = Self {
            name: name.into().trim().to_string(),
            institution: institution.into().trim().to_string(),
            program: program.into().trim().to_string(),
            term: term.into().trim().to_string(),
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> DomainResult<()> {
        let fields = [
            ("name", &self.name),
            ("institution", &self.institution),
            ("program", &self.program),
            ("term", &self.term),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate().is_ok()
    }
}
