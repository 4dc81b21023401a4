//! Input checks shared by the ticket and project stores

use crate::{Error, Result};

/// Reject blank free-text fields, returning the trimmed value
pub fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Require a non-blank email that contains '@'
pub fn email(value: &str) -> Result<String> {
    let value = required("email", value)?;
    if !value.contains('@') {
        return Err(Error::validation(format!(
            "'{}' is not a valid email address",
            value
        )));
    }
    Ok(value)
}

/// Require a progress percentage in 0..=100
///
/// Out-of-range values are rejected, never clamped.
pub fn progress(value: i64) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| {
            Error::validation(format!("progress must be between 0 and 100, got {}", value))
        })
}
