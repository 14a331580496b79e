use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct UserAuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub status: String,
    pub username: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /signup
/// Create an account; 400 when the username is already taken.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserAuthRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .shared
        .auth
        .signup(&payload.username, &payload.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "User created".to_string(),
    }))
}

/// POST /login
/// Verify credentials; 401 on mismatch or unknown user (same response for
/// both). The client holds the outcome itself; no session is issued.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserAuthRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = state
        .shared
        .auth
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        status: "success".to_string(),
        username,
    }))
}
