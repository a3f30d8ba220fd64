//! `/api/compose`: prompt in, generated continuation out.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use super::error::ApiError;
use super::types::ComposeResponse;
use super::{validation, AppState};

/// The one endpoint that reaches the decoding loop. The loop is
/// synchronous and blocking, so it runs on the blocking pool; the engine
/// handle is shared across all in-flight requests.
pub async fn compose(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ComposeResponse>, ApiError> {
    let request = validation::parse_compose_body(&body)?;
    tracing::debug!(
        query_len = request.query.len(),
        has_metadata = request.metadata.is_some(),
        "compose request"
    );

    let engine = state.engine.clone();
    let options = state.generate.clone();
    let output = tokio::task::spawn_blocking(move || engine.process(&request.query, &options))
        .await
        .map_err(|e| {
            tracing::error!("compose worker panicked: {e}");
            ApiError::Internal("generation task failed".to_string())
        })?
        .map_err(|e| {
            tracing::error!("generation failed: {e}");
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(ComposeResponse { response: output }))
}
