//! LLM error types with retry classification.
//!
//! Distinguishes between transient errors (worth another attempt) and fatal
//! errors (the same request will fail again).

use std::time::Duration;

/// Error from a completion call.
#[derive(Debug, Clone)]
pub struct LlmError {
    /// The kind of error
    pub kind: LlmErrorKind,
    /// HTTP status code, if applicable
    pub status_code: Option<u16>,
    /// Error message
    pub message: String,
    /// Delay requested by the provider via `Retry-After`, if any
    pub retry_after: Option<Duration>,
}

impl LlmError {
    /// Create a rate limit error.
    pub fn rate_limited(message: String, retry_after: Option<Duration>) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            status_code: Some(429),
            message,
            retry_after,
        }
    }

    /// Create a server error.
    pub fn server_error(status_code: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ServerError,
            status_code: Some(status_code),
            message,
            retry_after: None,
        }
    }

    /// Create a client error (bad request, auth, etc.).
    pub fn client_error(status_code: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ClientError,
            status_code: Some(status_code),
            message,
            retry_after: None,
        }
    }

    /// Create a client error for a request that could not be built or sent
    /// as specified (bad endpoint URL, unencodable body).
    pub fn invalid_request(message: String) -> Self {
        Self {
            kind: LlmErrorKind::ClientError,
            status_code: None,
            message,
            retry_after: None,
        }
    }

    /// Create a network error.
    pub fn network_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::NetworkError,
            status_code: None,
            message,
            retry_after: None,
        }
    }

    /// Create an envelope parse error (2xx response we could not read).
    pub fn parse_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::ParseError,
            status_code: None,
            message,
            retry_after: None,
        }
    }

    /// Build an error from a non-success HTTP status and response body.
    pub fn from_status(status_code: u16, body: &str, retry_after: Option<Duration>) -> Self {
        match classify_http_status(status_code) {
            LlmErrorKind::RateLimited => Self::rate_limited(body.to_string(), retry_after),
            LlmErrorKind::ClientError => Self::client_error(status_code, body.to_string()),
            LlmErrorKind::NetworkError => Self {
                kind: LlmErrorKind::NetworkError,
                status_code: Some(status_code),
                message: body.to_string(),
                retry_after: None,
            },
            _ => Self::server_error(status_code, body.to_string()),
        }
    }

    /// Check if this error is transient and should be retried.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

/// Classification of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Rate limited (429) - transient
    RateLimited,
    /// Server error (5xx) - transient
    ServerError,
    /// Client error (400, 401, 403, 404, ...) - fatal
    ClientError,
    /// Network error (connection failed, timeout, 408) - transient
    NetworkError,
    /// The provider answered but the envelope was unreadable
    ParseError,
}

impl LlmErrorKind {
    /// Check if this error kind is transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError
        )
    }
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmErrorKind::RateLimited => write!(f, "Rate limited"),
            LlmErrorKind::ServerError => write!(f, "Server error"),
            LlmErrorKind::ClientError => write!(f, "Client error"),
            LlmErrorKind::NetworkError => write!(f, "Network error"),
            LlmErrorKind::ParseError => write!(f, "Parse error"),
        }
    }
}

/// Parse HTTP status code into error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        408 => LlmErrorKind::NetworkError,
        429 => LlmErrorKind::RateLimited,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LlmErrorKind::RateLimited.is_transient());
        assert!(LlmErrorKind::ServerError.is_transient());
        assert!(LlmErrorKind::NetworkError.is_transient());
        assert!(!LlmErrorKind::ClientError.is_transient());
        assert!(!LlmErrorKind::ParseError.is_transient());
    }

    #[test]
    fn test_http_status_classification() {
        assert_eq!(classify_http_status(429), LlmErrorKind::RateLimited);
        assert_eq!(classify_http_status(500), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(502), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(503), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(400), LlmErrorKind::ClientError);
        assert_eq!(classify_http_status(401), LlmErrorKind::ClientError);
        assert_eq!(classify_http_status(403), LlmErrorKind::ClientError);
        assert_eq!(classify_http_status(408), LlmErrorKind::NetworkError);
    }

    #[test]
    fn request_timeout_status_is_retried() {
        let err = LlmError::from_status(408, "request timed out", None);
        assert_eq!(err.kind, LlmErrorKind::NetworkError);
        assert_eq!(err.status_code, Some(408));
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "Network error (HTTP 408): request timed out");
    }

    #[test]
    fn invalid_request_is_fatal() {
        let err = LlmError::invalid_request("builder error".to_string());
        assert_eq!(err.kind, LlmErrorKind::ClientError);
        assert_eq!(err.status_code, None);
        assert!(!err.is_transient());
    }

    #[test]
    fn from_status_keeps_retry_after_for_rate_limits() {
        let err = LlmError::from_status(429, "slow down", Some(Duration::from_secs(7)));
        assert_eq!(err.kind, LlmErrorKind::RateLimited);
        assert_eq!(err.retry_after, Some(Duration::from_secs(7)));

        let err = LlmError::from_status(401, "bad key", Some(Duration::from_secs(7)));
        assert_eq!(err.kind, LlmErrorKind::ClientError);
        assert_eq!(err.retry_after, None);
        assert_eq!(err.to_string(), "Client error (HTTP 401): bad key");
    }
}
