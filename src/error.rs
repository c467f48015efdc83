use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::response::remote_error_message;

/// Failure of a call to one of the remote pet services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("no authentication token found")]
    NotSignedIn,
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Maps a non-2xx response onto the typed taxonomy.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = remote_error_message(body);
        match status {
            400 | 422 => ApiError::Validation(message),
            401 | 403 => ApiError::Unauthorized,
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            _ => ApiError::Server { status, message },
        }
    }

    /// The backend's own message, when the failure carried one.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::Validation(msg)
            | ApiError::Server { message: msg, .. } => Some(msg),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Failure of the local JSON API.
#[derive(Debug)]
pub enum AppError {
    InternalServerError,
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Conflict(String),
    UnprocessableEntity(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized | ApiError::NotSignedIn => AppError::Unauthorized,
            ApiError::NotFound(msg) => AppError::NotFound(msg),
            ApiError::Conflict(msg) => AppError::Conflict(msg),
            ApiError::Validation(msg) => AppError::UnprocessableEntity(msg),
            other => {
                tracing::error!("Remote call failed: {}", other);
                AppError::InternalServerError
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(json!({
            "success": false,
            "message": error_message,
            "data": null
        }));

        (status, body).into_response()
    }
}
