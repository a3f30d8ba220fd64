//! Request and response DTOs for the public API.

use serde::Serialize;
use serde_json::{Map, Value};

/// Validated `/api/compose` request. Built by the validation layer rather
/// than derived deserialization so that shape violations come back as
/// field-level detail entries.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    /// The prompt text to continue.
    pub query: String,
    /// Freeform request metadata; may be null. Carried for logging, not
    /// consumed by generation.
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComposeResponse {
    /// The generated continuation.
    pub response: String,
}

/// Validated `/api/recommend` request.
#[derive(Debug, Clone)]
pub struct RecommendRequest {
    /// The requesting user's identifier.
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<String>,
}
