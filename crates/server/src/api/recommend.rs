//! `/api/recommend`: per-user article recommendations.

use axum::body::Bytes;
use axum::Json;

use super::error::ApiError;
use super::types::RecommendResponse;
use super::validation;

pub async fn recommend(body: Bytes) -> Result<Json<RecommendResponse>, ApiError> {
    let request = validation::parse_recommend_body(&body)?;
    tracing::debug!(user_id = %request.id, "recommend request");

    // TODO: wire the recommendation lookup once the article index service
    // lands; until then every user gets an empty list.
    Ok(Json(RecommendResponse {
        recommendations: Vec::new(),
    }))
}
