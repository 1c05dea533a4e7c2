//! Common validation rules shared across request payloads.

use validator::ValidationError;

pub const MAX_REASON_LENGTH: usize = 500;

/// Validates a moderation reason.
///
/// Requirements:
/// - Not blank
/// - At most 500 characters
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().is_empty() {
        return Err(ValidationError::new("reason_blank"));
    }
    if reason.chars().count() > MAX_REASON_LENGTH {
        return Err(ValidationError::new("reason_too_long"));
    }
    Ok(())
}

/// Validates a trade category used as an export filter.
pub fn validate_category(category: &str) -> Result<(), ValidationError> {
    let trimmed = category.trim();
    if trimmed.is_empty() || trimmed.len() > 100 {
        return Err(ValidationError::new("category_invalid_length"));
    }
    Ok(())
}
