use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use rand_core::OsRng;

use crate::errors::AppError;

const MIN_PASSWORD_LENGTH: usize = 8;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::internal(format!("failed to hash password: {err}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|err| AppError::internal(format!("invalid password hash: {err}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Trims `value` and checks its length in characters against `min..=max`.
pub fn required_text(field: &str, value: &str, min: usize, max: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();

    if len == 0 && min > 0 {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if len < min {
        return Err(AppError::validation(format!(
            "{field} must be at least {min} characters long"
        )));
    }
    if len > max {
        return Err(AppError::validation(format!(
            "{field} must be at most {max} characters long"
        )));
    }

    Ok(trimmed.to_string())
}

/// Like [`required_text`] for optional fields; blank input becomes `None`.
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => required_text(field, text, 1, max).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_is_rejected() {
        assert!(matches!(hash_password("short"), Err(AppError::Validation(_))));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn required_text_bounds() {
        assert_eq!(required_text("title", "  Brief  ", 1, 200).unwrap(), "Brief");
        assert!(required_text("title", "   ", 1, 200).is_err());
        assert!(required_text("content", "too short", 10, 1000).is_err());
        assert!(required_text("title", &"x".repeat(201), 1, 200).is_err());
        assert!(required_text("title", &"é".repeat(200), 1, 200).is_ok());
    }

    #[test]
    fn optional_text_blanks_to_none() {
        assert_eq!(optional_text("location", None, 200).unwrap(), None);
        assert_eq!(optional_text("location", Some("  "), 200).unwrap(), None);
        assert_eq!(optional_text("location", Some(" Room 2 "), 200).unwrap(), Some("Room 2".into()));
        assert!(optional_text("location", Some(&"x".repeat(201)), 200).is_err());
    }
}
