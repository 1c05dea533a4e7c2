use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::str::FromStr;

use crate::error::AppError;

pub fn parse_date_value(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, &'static str> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date_value(value)
            .ok_or("`from`/`to` must be a valid date (YYYY-MM-DD or RFC3339)")
            .map(Some),
        None => Ok(None),
    }
}

/// Trims a query value and drops it when empty.
pub fn normalize_filter(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses a typed id from a path or query segment.
pub fn parse_id<T: FromStr>(raw: &str, kind: &str) -> Result<T, AppError> {
    T::from_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", kind)))
}
