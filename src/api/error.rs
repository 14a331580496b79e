use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::services::{AnalysisError, AuthError};

/// Error envelope returned on failures; success responses are the plain
/// mappings the clients expect.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Signup conflict; surfaced as a client error.
    DuplicateUser,

    /// Login failure; message kept generic to avoid user enumeration.
    Unauthorized,

    ValidationError(String),

    DatabaseError(String),

    ClassifierError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateUser => write!(f, "Username already exists"),
            Self::Unauthorized => write!(f, "Invalid credentials"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ClassifierError(msg) => write!(f, "Classifier error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::DuplicateUser => (
                StatusCode::BAD_REQUEST,
                "Username exists or error occurred".to_string(),
            ),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ClassifierError(msg) => {
                tracing::error!("Classifier error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Sentiment analysis failed".to_string(),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: error_message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUser => Self::DuplicateUser,
            AuthError::InvalidCredentials => Self::Unauthorized,
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Store(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Classifier(e) => Self::ClassifierError(e.to_string()),
            AnalysisError::Explain(e) => Self::ClassifierError(e.to_string()),
            AnalysisError::Store(msg) => Self::DatabaseError(msg),
            AnalysisError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}
