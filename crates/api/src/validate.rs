//! Field validation helpers shared across handlers.

use crate::error::{ApiError, ApiResult};

pub fn normalize_email(value: &str) -> ApiResult<String> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ApiError::validation("invalid email address"));
    }
    Ok(trimmed)
}

pub fn require_trimmed(field: &str, value: &str, max: usize) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    validate_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

pub fn validate_length(field: &str, value: &str, max: usize) -> ApiResult<()> {
    if value.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn sanitize_optional_filter(value: Option<String>) -> Option<String> {
    value.and_then(|input| {
        let trimmed = input.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

/// Page/limit pair normalized to (offset, limit); page is 1-based.
pub fn paging(page: Option<u64>, limit: Option<u64>, max_limit: u64) -> ApiResult<(u64, u64)> {
    let page = page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::validation("page must be positive"));
    }
    let limit = limit.unwrap_or(20);
    if limit == 0 {
        return Err(ApiError::validation("limit must be positive"));
    }
    if limit > max_limit {
        return Err(ApiError::validation_code(
            "LIMIT_EXCEEDED",
            format!("limit cannot exceed {max_limit}"),
        ));
    }
    Ok(((page - 1) * limit, limit))
}

/// Parses a `HH:MM` wall-clock string to minutes since midnight.
pub fn parse_hhmm(field: &str, value: &str) -> ApiResult<i32> {
    let invalid = || ApiError::validation(format!("{field} must be HH:MM"));
    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

pub fn format_hhmm(minute: i32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}
