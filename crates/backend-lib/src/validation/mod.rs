// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Credential shape validation.
//!
//! These checks run before any store round-trip, so malformed input is
//! rejected without touching the credential store.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MIN_CREDENTIAL_LENGTH: usize = 3;
const MAX_CREDENTIAL_LENGTH: usize = 50;

/// Special characters a password must contain at least one of.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%&*-_";

// Regex patterns for validation
static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());
static PASSWORD_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9!@#$%&*\-_]+$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a username: 3-50 characters, letters, digits and underscores only.
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    let length = username.chars().count();

    if length < MIN_CREDENTIAL_LENGTH || length > MAX_CREDENTIAL_LENGTH {
        return Err(ValidationError::InvalidUsername(format!(
            "The username must be between {MIN_CREDENTIAL_LENGTH} and {MAX_CREDENTIAL_LENGTH} characters long"
        )));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "The username can only contain letters, numbers or underscores".to_string(),
        ));
    }

    Ok(username)
}

/// Validate a password: 3-50 characters over letters, digits and the
/// special set, with at least one special character required.
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    let length = password.chars().count();

    if length < MIN_CREDENTIAL_LENGTH || length > MAX_CREDENTIAL_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "The password must be between {MIN_CREDENTIAL_LENGTH} and {MAX_CREDENTIAL_LENGTH} characters long"
        )));
    }

    if !PASSWORD_CHARSET_REGEX.is_match(password) {
        return Err(ValidationError::InvalidPassword(format!(
            "The password can only contain letters, numbers and the special characters {PASSWORD_SPECIAL_CHARS}"
        )));
    }

    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Err(ValidationError::InvalidPassword(format!(
            "The password must contain at least one special character among the following: {PASSWORD_SPECIAL_CHARS}"
        )));
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        // Valid usernames
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("user_123").is_ok());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());

        // Too short
        assert!(matches!(
            validate_username("ab"),
            Err(ValidationError::InvalidUsername(_))
        ));

        // Too long
        assert!(matches!(
            validate_username(&"a".repeat(51)),
            Err(ValidationError::InvalidUsername(_))
        ));

        // Empty
        assert!(matches!(
            validate_username(""),
            Err(ValidationError::InvalidUsername(_))
        ));

        // Invalid characters
        assert!(matches!(
            validate_username("alice!"),
            Err(ValidationError::InvalidUsername(_))
        ));
        assert!(matches!(
            validate_username("al ice"),
            Err(ValidationError::InvalidUsername(_))
        ));
        assert!(matches!(
            validate_username("user-name"),
            Err(ValidationError::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_validate_password() {
        // Valid passwords
        assert!(validate_password("Secr3t!").is_ok());
        assert!(validate_password("a_b").is_ok());
        assert!(validate_password("p@ssword123").is_ok());

        // Too short
        assert!(matches!(
            validate_password("a!"),
            Err(ValidationError::InvalidPassword(_))
        ));

        // Too long
        let long = format!("{}!", "a".repeat(50));
        assert!(matches!(
            validate_password(&long),
            Err(ValidationError::InvalidPassword(_))
        ));

        // No special character
        assert!(matches!(
            validate_password("password123"),
            Err(ValidationError::InvalidPassword(_))
        ));

        // Character outside the accepted set
        assert!(matches!(
            validate_password("pass word!"),
            Err(ValidationError::InvalidPassword(_))
        ));
        assert!(matches!(
            validate_password("pass?word"),
            Err(ValidationError::InvalidPassword(_))
        ));
    }

    #[test]
    fn test_length_boundaries() {
        let password = format!("{}!", "a".repeat(49));
        assert_eq!(password.chars().count(), 50);
        assert!(validate_password(&password).is_ok());

        assert!(validate_password("ab!").is_ok());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"z".repeat(50)).is_ok());
    }
}
