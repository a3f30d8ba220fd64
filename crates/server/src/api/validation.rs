//! Request-shape validation.
//!
//! Bodies are parsed by hand from raw bytes so that every shape violation
//! is reported as a field-level detail entry (path, message, kind) rather
//! than a single opaque deserialization error. All violations for a body
//! are collected before failing.

use serde_json::Value;

use super::error::{ApiError, FieldError, KIND_JSON};
use super::types::{ComposeRequest, RecommendRequest};

/// Parse the shared envelope: non-empty body containing valid JSON.
fn parse_json_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.is_empty() {
        return Err(ApiError::validation(vec![FieldError::body(
            "Request body is empty",
            super::error::KIND_MISSING,
        )]));
    }
    serde_json::from_slice(body)
        .map_err(|_| ApiError::validation(vec![FieldError::body("Invalid JSON", KIND_JSON)]))
}

/// Validate and extract a `/api/compose` request.
///
/// `query` must be a string; `metadata` must be present but may be null or
/// an object.
pub fn parse_compose_body(body: &[u8]) -> Result<ComposeRequest, ApiError> {
    let value = parse_json_body(body)?;
    let mut errors = Vec::new();

    let query = match value.get("query") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) | None => {
            errors.push(FieldError::missing("query"));
            None
        }
    };

    let metadata = match value.get("metadata") {
        None => {
            errors.push(FieldError::missing("metadata"));
            None
        }
        Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.clone()),
        Some(_) => {
            errors.push(FieldError::wrong_type(
                "metadata",
                "Input should be an object or null",
            ));
            None
        }
    };

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }
    Ok(ComposeRequest {
        query: query.unwrap_or_default(),
        metadata,
    })
}

/// Validate and extract a `/api/recommend` request. `id` must be a string.
pub fn parse_recommend_body(body: &[u8]) -> Result<RecommendRequest, ApiError> {
    let value = parse_json_body(body)?;

    match value.get("id") {
        Some(Value::String(s)) => Ok(RecommendRequest { id: s.clone() }),
        Some(_) | None => Err(ApiError::validation(vec![FieldError::missing("id")])),
    }
}
