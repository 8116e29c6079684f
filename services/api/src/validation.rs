//! Input validation utilities
//!
//! Validators return the client-facing message on failure; handlers wrap it
//! in [`ApiError::InvalidInput`].

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ApiError;

/// Reject an empty field
pub fn require_non_empty(value: &str, field: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

/// Validate username
///
/// Letters, digits and underscores only, so a username can never look like
/// an email address at login.
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    require_non_empty(username, "Username")?;

    if username.len() < 3 {
        return Err(ApiError::InvalidInput(
            "Username must be at least 3 characters long".to_string(),
        ));
    }

    if username.len() > 32 {
        return Err(ApiError::InvalidInput(
            "Username must be at most 32 characters long".to_string(),
        ));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(ApiError::InvalidInput(
            "Username can only contain letters, numbers, and underscores".to_string(),
        ));
    }

    Ok(())
}

/// Validate email
///
/// Only the `local@domain` shape is checked; deliverability is not.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    require_non_empty(email, "Email")?;

    if email.len() > 254 {
        return Err(ApiError::InvalidInput(
            "Email must be at most 254 characters long".to_string(),
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("Failed to compile email regex"));

    if !regex.is_match(email) {
        return Err(ApiError::InvalidInput("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate an avatar URL: absolute http(s) with a host
pub fn validate_avatar_url(url: &str) -> Result<(), ApiError> {
    require_non_empty(url, "Avatar URL")?;

    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX.get_or_init(|| {
        Regex::new(r"^https?://[^\s/?#]+[^\s]*$").expect("Failed to compile URL regex")
    });

    if !regex.is_match(url) {
        return Err(ApiError::InvalidInput(
            "Avatar URL must be an http or https URL".to_string(),
        ));
    }

    Ok(())
}
