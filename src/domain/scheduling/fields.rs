//! Validators for the free-text fields of requests and sessions.

use crate::domain::foundation::ValidationError;

/// Maximum length of a subject or topic.
pub const MAX_LABEL_LENGTH: usize = 50;

/// Maximum length of the free-form details text.
pub const MAX_DETAILS_LENGTH: usize = 1000;

/// Trims and checks a subject/topic style label.
pub fn validate_label(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    let len = trimmed.chars().count();
    if len > MAX_LABEL_LENGTH {
        return Err(ValidationError::out_of_range(
            field,
            1,
            MAX_LABEL_LENGTH as i64,
            len as i64,
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims the details text. Empty details are allowed.
pub fn validate_details(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len > MAX_DETAILS_LENGTH {
        return Err(ValidationError::out_of_range(
            "details",
            0,
            MAX_DETAILS_LENGTH as i64,
            len as i64,
        ));
    }
    Ok(trimmed.to_string())
}
