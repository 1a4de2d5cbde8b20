//! Error handling module for the StudyHub sync layer.
//!
//! Provides a single error type for transport, decoding and server failures, plus parsing of
//! the backend's error envelopes.

use reqwest::StatusCode;
use serde::Deserialize;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
}

/// Sync layer error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Connection could not be established or was dropped
    Network(String),
    /// Request exceeded the configured timeout
    Timeout(String),
    /// Request rejected as invalid (400, 409, 422)
    Validation(String),
    /// Missing or rejected credentials (401, 403)
    Unauthorized(String),
    /// Entity does not exist (stale id)
    NotFound(String),
    /// Server failure (5xx or any other non-success status)
    Server { status: u16, message: String },
    /// Response body did not have the expected shape
    Decode(String),
}

impl SyncError {
    /// Classify a non-success HTTP status and its body message.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 | 409 | 422 => SyncError::Validation(message),
            401 | 403 => SyncError::Unauthorized(message),
            404 => SyncError::NotFound(message),
            408 | 504 => SyncError::Timeout(message),
            code => SyncError::Server {
                status: code,
                message,
            },
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Network(_) => codes::NETWORK_ERROR,
            SyncError::Timeout(_) => codes::TIMEOUT_ERROR,
            SyncError::Validation(_) => codes::VALIDATION_ERROR,
            SyncError::Unauthorized(_) => codes::UNAUTHORIZED,
            SyncError::NotFound(_) => codes::NOT_FOUND,
            SyncError::Server { .. } => codes::SERVER_ERROR,
            SyncError::Decode(_) => codes::DECODE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            SyncError::Network(msg) => msg.clone(),
            SyncError::Timeout(msg) => msg.clone(),
            SyncError::Validation(msg) => msg.clone(),
            SyncError::Unauthorized(msg) => msg.clone(),
            SyncError::NotFound(msg) => msg.clone(),
            SyncError::Server { message, .. } => message.clone(),
            SyncError::Decode(msg) => msg.clone(),
        }
    }

    /// Connectivity failures that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Network(_) | SyncError::Timeout(_))
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for SyncError {}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Timeout(format!("Request timed out: {}", err))
        } else if err.is_decode() {
            SyncError::Decode(format!("Malformed response: {}", err))
        } else if let Some(status) = err.status() {
            SyncError::from_status(status, err.to_string())
        } else {
            SyncError::Network(format!("Network error: {}", err))
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(format!("JSON error: {}", err))
    }
}

/// Error details in the backend's structured envelope.
#[derive(Debug, Deserialize)]
pub struct ErrorDetails {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// Error bodies the backend is known to send.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Structured { error: ErrorDetails },
    Plain { error: String },
    Message { message: String },
}

/// Extract the human-readable message from an error response body.
///
/// Falls back to the raw body, or the status reason when the body is empty.
pub fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Structured { error }) => error.message,
        Ok(ErrorBody::Plain { error }) => error,
        Ok(ErrorBody::Message { message }) => message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
        Err(_) => body.trim().to_string(),
    }
}
