//! Input rules for registration and password changes.

use crate::errors::AppError;

pub const NAME_LEN: std::ops::RangeInclusive<usize> = 4..=50;
pub const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 8..=32;

/// Trims and lowercases so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < *PASSWORD_LEN.start() {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            PASSWORD_LEN.start()
        )));
    }
    if len > *PASSWORD_LEN.end() {
        return Err(AppError::Validation(format!(
            "Password must be at most {} characters",
            PASSWORD_LEN.end()
        )));
    }
    Ok(())
}

pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), AppError> {
    let name_len = name.trim().chars().count();
    if !NAME_LEN.contains(&name_len) {
        return Err(AppError::Validation(format!(
            "Name must be between {} and {} characters",
            NAME_LEN.start(),
            NAME_LEN.end()
        )));
    }
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email".to_string()));
    }
    validate_password(password)?;
    if password != confirm_password {
        return Err(AppError::Validation("Passwords don't match".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.uk"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@localhost"));
        assert!(!is_valid_email("ada@example..com"));
        assert!(!is_valid_email("ada @example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_registration_rules() {
        assert!(validate_registration("Ada Lovelace", "ada@example.com", "correct-horse", "correct-horse").is_ok());
        assert!(validate_registration("Ada", "ada@example.com", "correct-horse", "correct-horse").is_err());
        assert!(validate_registration(&"x".repeat(51), "ada@example.com", "correct-horse", "correct-horse").is_err());
        assert!(validate_registration("Ada Lovelace", "not-an-email", "correct-horse", "correct-horse").is_err());
        assert!(validate_registration("Ada Lovelace", "ada@example.com", "short", "short").is_err());
        assert!(validate_registration("Ada Lovelace", "ada@example.com", &"p".repeat(33), &"p".repeat(33)).is_err());
        assert!(validate_registration("Ada Lovelace", "ada@example.com", "correct-horse", "correct-horsE").is_err());
    }

    #[test]
    fn test_password_bounds_are_inclusive() {
        assert!(validate_password(&"p".repeat(8)).is_ok());
        assert!(validate_password(&"p".repeat(32)).is_ok());
    }
}
