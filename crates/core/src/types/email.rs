//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace.
    #[error("email cannot contain whitespace")]
    ContainsWhitespace,
    /// The input does not have the shape `local@domain`.
    #[error("email must contain an @ symbol with text on both sides")]
    MalformedParts,
    /// The domain has no dot (e.g., `user@localhost`).
    #[error("email domain must contain a dot")]
    DomainMissingDot,
}

/// An email address.
///
/// Validation is deliberately shallow - the backend is the authority on
/// deliverability. This matches the storefront form check: some local part,
/// an `@`, and a dotted domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters,
    /// contains whitespace, lacks a non-empty local part or domain, or has
    /// a domain without a dot.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(EmailError::MalformedParts);
        };
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MalformedParts);
        }
        if !domain.contains('.') {
            return Err(EmailError::DomainMissingDot);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
        assert!(Email::parse("  padded@example.com  ").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert_eq!(Email::parse("").unwrap_err(), EmailError::Empty);
        assert_eq!(
            Email::parse("no-at-symbol").unwrap_err(),
            EmailError::MalformedParts
        );
        assert_eq!(
            Email::parse("@domain.com").unwrap_err(),
            EmailError::MalformedParts
        );
        assert_eq!(Email::parse("user@").unwrap_err(), EmailError::MalformedParts);
        assert_eq!(
            Email::parse("user@localhost").unwrap_err(),
            EmailError::DomainMissingDot
        );
        assert_eq!(
            Email::parse("us er@example.com").unwrap_err(),
            EmailError::ContainsWhitespace
        );
    }

    #[test]
    fn test_trimmed_on_parse() {
        let email = Email::parse(" a@b.co ").unwrap();
        assert_eq!(email.as_str(), "a@b.co");
    }
}
