//! API-level errors and the shared result-object response shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::storage::StorageError;
use crate::suggest::SuggestError;

/// JSON body used by mutation responses and by every error response.
#[derive(Debug, Serialize)]
pub struct ApiResult {
    pub ok: bool,
    pub message: String,
}

impl ApiResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthenticated")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => ApiError::NotFound,
            StorageError::Conflict(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<SuggestError> for ApiError {
    fn from(e: SuggestError) -> Self {
        match e {
            SuggestError::NotFound(_) => ApiError::NotFound,
            SuggestError::LimitExceedsMaximum { requested, max } => ApiError::BadRequest(
                format!("limit {requested} exceeds the maximum of {max}"),
            ),
            SuggestError::Storage(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Internal(e) = &self {
            tracing::error!(error = ?e, "request failed");
        }

        // internal details stay in the logs
        let message = match &self {
            ApiError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ApiResult::err(message))).into_response()
    }
}
