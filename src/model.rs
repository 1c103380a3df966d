//! Contact entity and input validation.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Practical RFC-5322-style email shape: local part, `@`, dotted domain with
/// an alphabetic TLD.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// A stored contact as returned over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Hex ObjectId assigned by the storage layer, immutable.
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Set once at creation; default sort key (descending).
    pub created_at: DateTime<Utc>,
}

/// Create/update payload. All three fields are required; updates are a full
/// replacement, never partial.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Input rejection reasons, worded as the API reports them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingField,

    #[error("Invalid email format")]
    InvalidEmail,
}

impl ContactInput {
    /// Check presence of all fields and the email format.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.phone.trim().is_empty()
        {
            return Err(ValidationError::MissingField);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, phone: &str) -> ContactInput {
        ContactInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn accepts_complete_input() {
        assert_eq!(input("Ann", "ann@x.com", "111").validate(), Ok(()));
    }

    #[test]
    fn rejects_missing_fields() {
        assert_eq!(
            input("", "ann@x.com", "111").validate(),
            Err(ValidationError::MissingField)
        );
        assert_eq!(
            input("Ann", "", "111").validate(),
            Err(ValidationError::MissingField)
        );
        assert_eq!(
            input("Ann", "ann@x.com", "   ").validate(),
            Err(ValidationError::MissingField)
        );
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["ann", "ann@", "@x.com", "ann@x", "ann @x.com", "ann@x..com y"] {
            assert_eq!(
                input("Ann", email, "111").validate(),
                Err(ValidationError::InvalidEmail),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("no-at-sign.example.com"));
    }
}
