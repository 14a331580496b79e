use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState};
use super::auth::MessageResponse;
use crate::classifier::Sentiment;
use crate::db::Review;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub movie: String,
    pub review: String,
    pub username: String,

    /// Skip the attribution step when false. Defaults to the server's
    /// configured behavior.
    #[serde(default)]
    pub explain: Option<bool>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub sentiment: Sentiment,
    pub confidence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_html: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateQuery {
    pub new_movie_name: String,
    pub new_review_text: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /analyze
/// Classify a review, persist the verdict, and attach the explanation
/// artifact unless it was skipped or came back empty.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::ValidationError("Username is required".to_string()));
    }

    let result = state
        .shared
        .analysis
        .analyze(
            &payload.username,
            &payload.movie,
            &payload.review,
            payload.explain,
        )
        .await?;

    Ok(Json(AnalyzeResponse {
        sentiment: result.sentiment,
        confidence: result.confidence,
        explanation_html: result.explanation_html,
    }))
}

/// GET /history/{username}
/// All of one owner's reviews, most recent first; `[]` when there are none.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let rows = state.shared.store.list_reviews_by_owner(&username).await?;
    Ok(Json(rows))
}

/// PUT /update/{review_id}
/// Re-classify the new text and overwrite the stored verdict. No existence
/// or ownership check: unknown ids succeed silently, and any caller holding
/// a valid id can modify any user's row.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(review_id): Path<i32>,
    Query(query): Query<UpdateQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .shared
        .analysis
        .update(review_id, &query.new_movie_name, &query.new_review_text)
        .await?;

    Ok(Json(MessageResponse {
        message: "Update successful".to_string(),
    }))
}

/// DELETE /delete/{review_id}
/// Silent no-op on unknown ids; no ownership check (see PUT /update).
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(review_id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.shared.store.delete_review(review_id).await?;

    Ok(Json(MessageResponse {
        message: "Deleted".to_string(),
    }))
}
