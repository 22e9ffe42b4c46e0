use std::fmt;
use thiserror::Error;

/// Main error type for the liftlog client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server could not be reached or the connection broke
    #[error("Request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-success status
    #[error("Server error {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Raw response body, untouched
        body: String,
    },

    /// Credential renewal failed and the session was terminated
    #[error("Session expired: {reason}")]
    SessionExpired { reason: String },

    /// Durable credential storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Input rejected before it was sent
    #[error("Validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

/// Type alias for client results
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Create an HTTP error from a status code and raw body
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = extract_message(status, &body);
        Self::Http {
            status,
            message,
            body,
        }
    }

    /// HTTP status of the failure, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 401 response
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Error code for programmatic handling
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::NetworkUnreachable,
            Self::Timeout(_) => ErrorCode::NetworkTimeout,
            Self::Http { status, .. } => match status {
                400 => ErrorCode::ApiBadRequest,
                401 => ErrorCode::AuthTokenExpired,
                403 => ErrorCode::ApiPermissionDenied,
                404 => ErrorCode::ApiNotFound,
                409 | 422 => ErrorCode::ApiValidationFailed,
                429 => ErrorCode::ApiRateLimited,
                _ => ErrorCode::ApiRequestFailed,
            },
            Self::SessionExpired { .. } => ErrorCode::AuthRefreshFailed,
            Self::Storage(_) => ErrorCode::StorageFailed,
            Self::Serialization(_) => ErrorCode::ApiResponseInvalid,
            Self::Configuration(_) => ErrorCode::ConfigInvalid,
            Self::Validation(_) => ErrorCode::InputInvalid,
        }
    }

    /// Category for filtering and handling
    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The API reports failures as `{"detail": "..."}`; some proxies use
/// `{"message": "..."}`. Anything else falls back to the body text or
/// the canonical reason phrase.
fn extract_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

/// Enumeration of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Configuration errors
    ConfigInvalid,

    // Network errors
    NetworkUnreachable,
    NetworkTimeout,

    // Authentication errors
    AuthTokenExpired,
    AuthRefreshFailed,

    // API errors
    ApiBadRequest,
    ApiPermissionDenied,
    ApiNotFound,
    ApiValidationFailed,
    ApiRateLimited,
    ApiRequestFailed,
    ApiResponseInvalid,

    // Local errors
    StorageFailed,
    InputInvalid,
}

impl ErrorCode {
    /// Category this code belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::ConfigInvalid => ErrorCategory::Configuration,
            ErrorCode::NetworkUnreachable | ErrorCode::NetworkTimeout => ErrorCategory::Network,
            ErrorCode::AuthTokenExpired | ErrorCode::AuthRefreshFailed => {
                ErrorCategory::Authentication
            }
            ErrorCode::ApiBadRequest
            | ErrorCode::ApiPermissionDenied
            | ErrorCode::ApiNotFound
            | ErrorCode::ApiValidationFailed
            | ErrorCode::ApiRateLimited
            | ErrorCode::ApiRequestFailed
            | ErrorCode::ApiResponseInvalid => ErrorCategory::Service,
            ErrorCode::StorageFailed => ErrorCategory::Internal,
            ErrorCode::InputInvalid => ErrorCategory::Validation,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code_str = match self {
            ErrorCode::ConfigInvalid => "CONFIG_INVALID",

            ErrorCode::NetworkUnreachable => "NETWORK_UNREACHABLE",
            ErrorCode::NetworkTimeout => "NETWORK_TIMEOUT",

            ErrorCode::AuthTokenExpired => "AUTH_TOKEN_EXPIRED",
            ErrorCode::AuthRefreshFailed => "AUTH_REFRESH_FAILED",

            ErrorCode::ApiBadRequest => "API_BAD_REQUEST",
            ErrorCode::ApiPermissionDenied => "API_PERMISSION_DENIED",
            ErrorCode::ApiNotFound => "API_NOT_FOUND",
            ErrorCode::ApiValidationFailed => "API_VALIDATION_FAILED",
            ErrorCode::ApiRateLimited => "API_RATE_LIMITED",
            ErrorCode::ApiRequestFailed => "API_REQUEST_FAILED",
            ErrorCode::ApiResponseInvalid => "API_RESPONSE_INVALID",

            ErrorCode::StorageFailed => "STORAGE_FAILED",
            ErrorCode::InputInvalid => "INPUT_INVALID",
        };
        write!(f, "{}", code_str)
    }
}

/// Error category for filtering and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (connection, timeout, etc.)
    Network,
    /// Authentication-related errors
    Authentication,
    /// Configuration-related errors
    Configuration,
    /// Errors reported by the remote API
    Service,
    /// Input that failed local validation
    Validation,
    /// Internal errors
    Internal,
}
