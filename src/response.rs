use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// A standardized response wrapper for the local API.
/// This ensures consistent JSON structure across all endpoints.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful.
    pub success: bool,
    /// A message describing the result (mostly for confirmations).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The actual data payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Creates a success response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }
}

/// Helper struct for responses without data (e.g., just a message)
#[derive(Serialize)]
pub struct EmptyData;

impl ApiResponse<EmptyData> {
    /// Creates a success response with just a message.
    pub fn ok(message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: None,
        }
    }
}

/// Implement IntoResponse for ApiResponse to simplify handler returns.
impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Shapes the remote services use for error bodies.
#[derive(Deserialize)]
struct RemoteErrorBody {
    message: Option<String>,
    error: Option<String>,
    detail: Option<String>,
}

/// Extracts the human-readable message from a remote error body.
///
/// JSON bodies with a `message`, `error` or `detail` string win, in that
/// order. Anything else is returned as trimmed raw text.
pub fn remote_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<RemoteErrorBody>(body) {
        if let Some(msg) = parsed.message.or(parsed.error).or(parsed.detail) {
            return msg;
        }
    }
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_json_message_fields() {
        assert_eq!(remote_error_message(r#"{"message":"Like does not exist"}"#), "Like does not exist");
        assert_eq!(remote_error_message(r#"{"error":"Pet not found"}"#), "Pet not found");
        assert_eq!(remote_error_message(r#"{"detail":"Error desconocido"}"#), "Error desconocido");
    }

    #[test]
    fn falls_back_to_raw_text() {
        assert_eq!(remote_error_message("  Like already exists\n"), "Like already exists");
        assert_eq!(remote_error_message(r#"{"status":400}"#), r#"{"status":400}"#);
    }
}
