use thiserror::Error;

/// Failure of a single remote call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Connection refused, reset or DNS failure
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Non-success HTTP status, `message` is the service's error text when it sent one
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The service rejected the HTTP method itself, e.g. behavior replacement
    /// on API versions that only accept creation.
    pub fn is_method_not_supported(&self) -> bool {
        match self {
            ApiError::Status { status: 405, .. } => true,
            ApiError::Status { message, .. } | ApiError::Other(message) => message.contains("PUT"),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            ApiError::Connection(error.to_string())
        } else if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            ApiError::status(status.as_u16(), error.to_string())
        } else {
            ApiError::Other(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Decode(error.to_string())
    }
}
