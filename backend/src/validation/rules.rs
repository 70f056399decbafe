//! Validation rules shared across request payloads.

use validator::ValidationError;

use crate::models::request_status::RequestStatus;

/// Most days a single allocation may grant.
pub const MAX_ALLOCATION_DAYS: i32 = 366;

/// Accepts any known request status, case-insensitively.
pub fn validate_request_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<RequestStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("request_status_unknown"))
}

/// Leave type codes are short lowercase identifiers such as `annual`.
pub fn validate_leave_type_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || code.len() > 32 {
        return Err(ValidationError::new("leave_type_invalid_length"));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::new("leave_type_invalid_characters"));
    }
    Ok(())
}
