use reqwest::StatusCode;
use std::fmt;

/// Errors that can occur during CMS communication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// Non-2xx response not covered by a more specific variant
    HttpError(String),
    /// CMS unreachable, timed out or answering 5xx
    ServiceUnavailable(String),
    /// Response body could not be mapped to an entity
    InvalidResponse(String),
    /// Authentication error (401/403)
    Unauthorized(String),
    /// Not found (404)
    NotFound(String),
    /// Rate limited (429)
    RateLimited(String),
    /// Internal error in connector
    Internal(String),
}

impl ConnectorError {
    /// Picks a variant from the response status. `message` is the
    /// human-readable text extracted from the CMS error envelope.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(message),
            s if s.is_server_error() => Self::ServiceUnavailable(message),
            _ => Self::HttpError(message),
        }
    }

    /// Transport-level failures worth retrying on idempotent reads.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_) | Self::RateLimited(_))
    }

    /// The message without the variant prefix, suitable for a user-facing alert.
    pub fn message(&self) -> &str {
        match self {
            Self::HttpError(msg)
            | Self::ServiceUnavailable(msg)
            | Self::InvalidResponse(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::RateLimited(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            Self::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ConnectorError {}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            Self::ServiceUnavailable(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
