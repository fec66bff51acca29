//! Email address type.
//!
//! Customer emails arrive from Stripe checkout sessions and key the
//! opportunistic address cache, so they are validated once at the boundary
//! and passed around as a typed value afterwards.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone)]
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
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// An email address.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Must contain an @ symbol
/// - Local part (before @) must not be empty
/// - Domain part (after @) must not be empty
///
/// ## Examples
///
/// ```
/// use stride_core::Email;
///
/// assert!(Email::parse("user@example.com").is_ok());
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@domain.com").is_err());
/// assert!(Email::parse("user@").is_err());
/// ```
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
    /// missing an @ symbol, or has an empty local part or domain.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(EmailError::MissingAtSymbol)?;

        if at_pos == 0 {
            return Err(EmailError::EmptyLocalPart);
        }

        if at_pos == s.len() - 1 {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
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
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let email = Email::parse("runner@stridesports.dev").expect("valid email");
        assert_eq!(email.as_str(), "runner@stridesports.dev");
        assert_eq!(email.to_string(), "runner@stridesports.dev");
    }

    #[test]
    fn test_parse_plus_tag() {
        assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
    }

    #[test]
    fn test_parse_missing_at() {
        assert!(matches!(
            Email::parse("nobody"),
            Err(EmailError::MissingAtSymbol)
        ));
    }

    #[test]
    fn test_parse_empty_local_part() {
        assert!(matches!(
            Email::parse("@example.com"),
            Err(EmailError::EmptyLocalPart)
        ));
    }

    #[test]
    fn test_parse_empty_domain() {
        assert!(matches!(Email::parse("user@"), Err(EmailError::EmptyDomain)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { max: 254 })
        ));
    }
}
