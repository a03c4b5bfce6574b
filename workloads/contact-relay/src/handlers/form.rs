//! Body parsing and field validation shared by the submission routes.

use edge_sdk::edge_core::RequestContext;
use edge_sdk::edge_security::BodyLimit;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ValidationError;

pub const MAX_NAME_CHARS: usize = 200;
pub const MAX_EMAIL_CHARS: usize = 320;
pub const MAX_SHORT_TEXT_CHARS: usize = 200;
pub const MAX_MESSAGE_CHARS: usize = 10_000;

/// Check the body size, then decode it as a JSON object.
///
/// Arrays and scalars are refused before field mapping, so positional
/// bodies never fill a form and errors never name a Rust type.
pub fn parse_body<T: DeserializeOwned>(
    req: &RequestContext,
    limit: &BodyLimit,
) -> Result<T, ValidationError> {
    limit.check(req.body.len())?;
    let value: Value = serde_json::from_slice(&req.body)?;
    if !value.is_object() {
        return Err(ValidationError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

/// Required text: trimmed, non-empty, at most `max` characters.
pub fn required(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<String, ValidationError> {
    optional(value, field, max)?.ok_or(ValidationError::MissingField(field))
}

/// Optional text: trimmed; blank counts as absent.
pub fn optional(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(Some(value))
}

/// Required email: one `@`, non-empty local part, dotted domain.
pub fn email(value: Option<String>) -> Result<String, ValidationError> {
    let email = required(value, "email", MAX_EMAIL_CHARS)?;
    if !is_plausible_email(&email) {
        return Err(ValidationError::InvalidEmail(email));
    }
    Ok(email)
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
