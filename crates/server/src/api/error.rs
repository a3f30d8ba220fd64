//! HTTP-facing error shapes.
//!
//! Two kinds, and the distinction matters: caller-input errors surface as
//! 422 with a field-level detail list and must never be retried by the
//! boundary; internal failures surface as a generic 500 with a short
//! message and no internal detail beyond it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const KIND_MISSING: &str = "value_error.missing";
pub const KIND_JSON: &str = "value_error.jsondecode";
pub const KIND_TYPE: &str = "type_error";

/// One field-level request-shape violation.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// Path of the offending field, e.g. `["query"]` or `["body"]`.
    pub loc: Vec<String>,
    /// Human-readable message.
    pub msg: String,
    /// Error-kind tag.
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl FieldError {
    pub fn missing(field: &str) -> Self {
        Self {
            loc: vec![field.to_string()],
            msg: "Field required".to_string(),
            kind: KIND_MISSING,
        }
    }

    pub fn wrong_type(field: &str, msg: &str) -> Self {
        Self {
            loc: vec![field.to_string()],
            msg: msg.to_string(),
            kind: KIND_TYPE,
        }
    }

    pub fn body(msg: &str, kind: &'static str) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.to_string(),
            kind,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Malformed request: 422 with a detail list.
    Validation(Vec<FieldError>),
    /// Internal failure: 500 with a short generic message.
    Internal(String),
}

impl ApiError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

#[derive(Serialize)]
struct ValidationBody {
    detail: Vec<FieldError>,
}

#[derive(Serialize)]
struct InternalBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                axum::Json(ValidationBody { detail }),
            )
                .into_response(),
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(InternalBody { error }),
            )
                .into_response(),
        }
    }
}
