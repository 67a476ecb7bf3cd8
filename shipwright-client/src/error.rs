//! Error types for the repository host client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the repository host
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if this error is a rate limit rejection
    ///
    /// The host answers primary limits with 429 and secondary limits with a
    /// 403 whose message mentions the rate limit.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::ApiError { status: 429, .. } => true,
            Self::ApiError {
                status: 403,
                message,
            } => message.to_ascii_lowercase().contains("rate limit"),
            _ => false,
        }
    }

    /// Check if retrying the same call later may succeed
    ///
    /// Transport failures, server errors, rate limits and garbled bodies are
    /// transient. Authentication failures, missing resources and other 4xx
    /// rejections are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(e) => !e.is_builder(),
            Self::ParseError(_) => true,
            Self::ApiError { .. } => self.is_server_error() || self.is_rate_limited(),
            Self::NotFound(_) | Self::InvalidRequest(_) | Self::InternalError(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_transient() {
        assert!(ClientError::api_error(502, "Bad Gateway").is_transient());
        assert!(ClientError::api_error(503, "unavailable").is_server_error());
    }

    #[test]
    fn test_rate_limits_are_transient() {
        assert!(ClientError::api_error(429, "Too Many Requests").is_transient());
        assert!(
            ClientError::api_error(403, "You have exceeded a secondary Rate Limit").is_transient()
        );
    }

    #[test]
    fn test_auth_and_missing_are_permanent() {
        assert!(!ClientError::api_error(401, "Bad credentials").is_transient());
        assert!(!ClientError::api_error(403, "Resource not accessible").is_transient());
        assert!(!ClientError::NotFound("repo".to_string()).is_transient());
        assert!(ClientError::NotFound("repo".to_string()).is_not_found());
        assert!(ClientError::api_error(404, "Not Found").is_not_found());
        assert!(ClientError::api_error(422, "Unprocessable").is_client_error());
    }

    #[test]
    fn test_parse_errors_are_transient() {
        assert!(ClientError::ParseError("truncated body".to_string()).is_transient());
    }
}
