//! Field checks shared by the request DTOs.
//!
//! Every check appends a human-readable message instead of failing fast, so a
//! client gets all problems with its payload in one response.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub const MAX_EMAIL_LEN: usize = 254;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid");
    }
    email.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

/// Checks the trimmed length of `value` in characters.
pub fn check_length(errors: &mut Vec<String>, field: &str, value: &str, min: usize, max: usize) {
    let len = value.trim().chars().count();
    if len == 0 && min > 0 {
        errors.push(format!("{field} is required"));
    } else if len < min {
        errors.push(format!("{field} must be at least {min} characters"));
    } else if len > max {
        errors.push(format!("{field} must be at most {max} characters"));
    }
}

/// Like [`check_length`] but a missing value is reported as required.
pub fn check_required(
    errors: &mut Vec<String>,
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
) {
    match value {
        Some(v) => check_length(errors, field, v, min.max(1), max),
        None => errors.push(format!("{field} is required")),
    }
}

pub fn finish(errors: Vec<String>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(is_valid_email("student@univ.edu.ua"));
        assert!(!is_valid_email("student@localhost"));
        assert!(!is_valid_email("no at sign.com"));
        assert!(!is_valid_email(&format!("{}@example.com", "a".repeat(250))));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut errors = Vec::new();
        check_length(&mut errors, "name", "Їжа", 3, 3);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn collects_every_problem() {
        let mut errors = Vec::new();
        check_required(&mut errors, "title", None, 1, 10);
        check_required(&mut errors, "room", Some("   "), 1, 10);
        check_length(&mut errors, "name", "ab", 3, 50);
        check_length(&mut errors, "note", "abcdef", 0, 5);
        assert_eq!(
            errors,
            vec![
                "title is required",
                "room is required",
                "name must be at least 3 characters",
                "note must be at most 5 characters",
            ]
        );
        assert!(matches!(finish(errors), Err(AppError::Validation(v)) if v.len() == 4));
        assert!(finish(Vec::new()).is_ok());
    }
}
