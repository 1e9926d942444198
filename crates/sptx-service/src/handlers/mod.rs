//! API handlers.

pub mod banks;
pub mod enhance;
pub mod health;
pub mod mail;
pub mod payments;
pub mod tickets;
pub mod webhooks;

use crate::error::ApiError;

/// Require a non-blank string field.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}
