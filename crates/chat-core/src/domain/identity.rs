//! Username Gate.
//!
//! A candidate username must be at least [`MIN_IDENTITY_LEN`] characters
//! long before a session may be started with it.  The gate is advisory: it
//! reports an error for the current candidate but never stops the caller from
//! editing the candidate further.  Length is counted in Unicode scalar values,
//! so `"zoë!"` is four characters even though it is five bytes.

use std::fmt;

use thiserror::Error;

/// Minimum number of characters in a username.
pub const MIN_IDENTITY_LEN: usize = 4;

/// Reasons a candidate username is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The candidate has fewer than `min` characters.
    ///
    /// The `Display` text is user-facing and is shown next to the input.
    #[error("Name must be at least {min} characters long.")]
    TooShort {
        /// Length of the rejected candidate, in characters.
        len: usize,
        /// Required minimum.
        min: usize,
    },
}

/// Checks a candidate username against the gate rules.
///
/// # Errors
///
/// Returns [`ValidationError::TooShort`] when the candidate has fewer than
/// [`MIN_IDENTITY_LEN`] characters.
///
/// # Examples
///
/// ```rust
/// use chat_core::domain::identity::validate;
///
/// assert!(validate("bob").is_err());
/// assert!(validate("bobby").is_ok());
/// ```
pub fn validate(candidate: &str) -> Result<(), ValidationError> {
    let len = candidate.chars().count();
    if len < MIN_IDENTITY_LEN {
        return Err(ValidationError::TooShort {
            len,
            min: MIN_IDENTITY_LEN,
        });
    }
    Ok(())
}

/// A username that has passed the gate.
///
/// The only way to build one is [`Identity::parse`], so holding an `Identity`
/// proves the name was validated.  It is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Validates `candidate` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] produced by [`validate`].
    pub fn parse(candidate: impl Into<String>) -> Result<Self, ValidationError> {
        let candidate = candidate.into();
        validate(&candidate)?;
        Ok(Self(candidate))
    }

    /// Returns the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identity and returns the owned username.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_characters_is_too_short() {
        // Arrange / Act
        let result = validate("bob");

        // Assert
        assert_eq!(result, Err(ValidationError::TooShort { len: 3, min: 4 }));
    }

    #[test]
    fn test_exactly_four_characters_passes() {
        assert_eq!(validate("anna"), Ok(()));
    }

    #[test]
    fn test_empty_string_is_too_short() {
        assert_eq!(validate(""), Err(ValidationError::TooShort { len: 0, min: 4 }));
    }

    #[test]
    fn test_every_length_below_minimum_is_rejected() {
        for len in 0..MIN_IDENTITY_LEN {
            let candidate = "x".repeat(len);
            assert!(validate(&candidate).is_err(), "length {len} must be rejected");
        }
        for len in MIN_IDENTITY_LEN..MIN_IDENTITY_LEN + 8 {
            let candidate = "x".repeat(len);
            assert!(validate(&candidate).is_ok(), "length {len} must pass");
        }
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // "zoë" is 3 characters but 4 bytes.
        assert!(validate("zoë").is_err());
        assert!(validate("zoë!").is_ok());
    }

    #[test]
    fn test_too_short_message_is_user_facing() {
        let err = validate("ab").unwrap_err();
        assert_eq!(err.to_string(), "Name must be at least 4 characters long.");
    }

    #[test]
    fn test_identity_parse_rejects_short_name() {
        assert!(Identity::parse("bob").is_err());
    }

    #[test]
    fn test_identity_parse_keeps_name_verbatim() {
        let id = Identity::parse("bobby").unwrap();
        assert_eq!(id.as_str(), "bobby");
        assert_eq!(id.to_string(), "bobby");
        assert_eq!(id.into_string(), "bobby");
    }
}
