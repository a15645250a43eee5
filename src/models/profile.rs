//! User profile
//!
//! There is exactly one profile per data directory. Its main currency is the
//! unit every cross-account total is expressed in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::CurrencyCode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    pub main_currency: CurrencyCode,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(name: impl Into<String>, main_currency: CurrencyCode) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            email: None,
            main_currency,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProfileValidationError::EmptyName);
        }
        if let Some(email) = &self.email {
            let valid = email
                .split_once('@')
                .map(|(user, domain)| !user.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            if !valid {
                return Err(ProfileValidationError::InvalidEmail(email.clone()));
            }
        }
        Ok(())
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("Me", CurrencyCode::USD)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.main_currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    EmptyName,
    InvalidEmail(String),
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Profile name cannot be empty"),
            Self::InvalidEmail(e) => write!(f, "Invalid email address: {}", e),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = Profile::default();
        assert_eq!(profile.name, "Me");
        assert_eq!(profile.main_currency, CurrencyCode::USD);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_email_validation() {
        let mut profile = Profile::default();
        profile.email = Some("ana@example.com".into());
        assert!(profile.validate().is_ok());

        profile.email = Some("not-an-email".into());
        assert!(matches!(
            profile.validate(),
            Err(ProfileValidationError::InvalidEmail(_))
        ));
    }
}
