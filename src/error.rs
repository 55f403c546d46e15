// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::ckan::CkanError;
use crate::session::SessionError;
use crate::stories::StoryError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error (missing required configuration)
    ConfigError(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::ConfigError(_) => 500,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::ConfigError(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to the uniform JSON error envelope
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        ApiError::ConfigError(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert component error types to ApiError
impl From<CkanError> for ApiError {
    fn from(err: CkanError) -> Self {
        match err {
            CkanError::UrlNotConfigured => ApiError::config_error("CKAN URL not configured"),
            CkanError::MissingApiKey => ApiError::config_error("CKAN configuration missing"),
            // Remote-declared failure: the message is forwarded to the operator verbatim
            CkanError::Upstream(msg) => ApiError::bad_request(msg),
            CkanError::Transport(e) => {
                // Log the real error but return generic message
                tracing::error!("CKAN request failed: {}", e);
                ApiError::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<StoryError> for ApiError {
    fn from(err: StoryError) -> Self {
        match err {
            StoryError::RootUnset => ApiError::config_error("Stories path not configured"),
            StoryError::RootNotFound => ApiError::not_found("Stories directory not found"),
            StoryError::InvalidSlug => ApiError::bad_request(
                "Invalid slug format. Use lowercase letters, numbers, and hyphens only.",
            ),
            StoryError::AlreadyExists => {
                ApiError::conflict("A story with this slug already exists")
            }
            StoryError::NotFound => ApiError::not_found("Story not found"),
            StoryError::InvalidDocument(msg) => {
                tracing::error!("malformed story document: {}", msg);
                ApiError::internal_server_error("Failed to read story")
            }
            StoryError::Io(e) => {
                tracing::error!("story storage error: {}", e);
                ApiError::internal_server_error("Story storage error")
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MissingSecret => ApiError::config_error("Session secret not configured"),
            SessionError::Encode(msg) => {
                tracing::error!("session encoding failed: {}", msg);
                ApiError::internal_server_error("Internal server error")
            }
            SessionError::Malformed => ApiError::unauthorized("Not authenticated"),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
