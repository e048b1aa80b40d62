/*
[INPUT]:  Error sources (HTTP, API status, serialization, auth, credential file)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Task Service adapter
#[derive(Error, Debug)]
pub enum TaskdeckError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Server rejected the bearer credential (HTTP 401)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Stored token is past its expiry
    #[error("Access token expired, please log in again")]
    TokenExpired,

    /// No bearer token is held; the request was not sent
    #[error("Not logged in")]
    MissingCredential,

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential file could not be read or written
    #[error("Credential storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },
}

impl TaskdeckError {
    /// Check if the error is transient
    pub fn is_retryable(&self) -> bool {
        match self {
            TaskdeckError::Http(_)
            | TaskdeckError::RateLimit { .. }
            | TaskdeckError::InvalidResponse(_) => true,
            TaskdeckError::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Check if error means the credential is gone or no longer accepted
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            TaskdeckError::Authentication { .. }
                | TaskdeckError::TokenExpired
                | TaskdeckError::MissingCredential
        )
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        TaskdeckError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    /// Classify a non-success response
    pub fn from_status(status: StatusCode, body: &str, retry_after: Option<u64>) -> Self {
        let message = detail_message(body);
        match status {
            StatusCode::UNAUTHORIZED => TaskdeckError::Authentication { message },
            StatusCode::TOO_MANY_REQUESTS => TaskdeckError::RateLimit {
                retry_after: retry_after.unwrap_or(1),
            },
            _ => TaskdeckError::api_error(status, message),
        }
    }
}

/// Extract FastAPI's `detail` field, falling back to the raw body
fn detail_message(body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        });

    match detail {
        Some(detail) => detail,
        None if body.trim().is_empty() => "empty response body".to_string(),
        None => body.trim().to_string(),
    }
}

/// Result type alias for Task Service operations
pub type Result<T> = std::result::Result<T, TaskdeckError>;
