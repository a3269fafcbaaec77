//! Errors returned by the API clients.

use std::fmt;

use serde::Deserialize;

/// Error categories for API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection refused, DNS failure, timeout, broken body stream
    Transport,
    /// Non-2xx response from the server
    HttpStatus,
    /// 2xx response whose body does not match the expected shape
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the MovieRama API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status, when the server answered
    pub status: Option<u16>,
    /// One-line summary suitable for display
    pub message: String,
    /// Raw response body or transport error text
    pub details: Option<String>,
}

/// Error body shape used by the API: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: serde_json::Value,
}

impl ApiError {
    /// Creates an HTTP status error, preferring the server's `message` field.
    pub fn http_status(status: u16, body: &str) -> Self {
        let server_message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| match parsed.message {
                serde_json::Value::String(text) => Some(text),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Self {
            kind: ApiErrorKind::HttpStatus,
            status: Some(status),
            message: server_message.unwrap_or_else(|| format!("HTTP {status}")),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn transport(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Could not connect to the MovieRama API".to_string()
        } else {
            "Request failed".to_string()
        };
        Self {
            kind: ApiErrorKind::Transport,
            status: None,
            message,
            details: Some(err.to_string()),
        }
    }

    pub fn parse(context: &str, err: &serde_json::Error) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            status: None,
            message: format!("Unexpected response from {context}"),
            details: Some(err.to_string()),
        }
    }

    /// Returns true when the API rejected the session token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_uses_server_message() {
        let err = ApiError::http_status(400, r#"{"message":"title required"}"#);
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "title required");
        assert_eq!(err.to_string(), "title required");
    }

    #[test]
    fn test_http_status_without_json_falls_back() {
        let err = ApiError::http_status(502, "<html>bad gateway</html>");
        assert_eq!(err.message, "HTTP 502");
        assert_eq!(err.details.as_deref(), Some("<html>bad gateway</html>"));

        let err = ApiError::http_status(500, "");
        assert_eq!(err.message, "HTTP 500");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_non_string_message_is_rendered() {
        let err = ApiError::http_status(400, r#"{"message":["a","b"]}"#);
        assert_eq!(err.message, r#"["a","b"]"#);
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::http_status(401, r#"{"message":"invalid or expired jwt"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.message, "invalid or expired jwt");
    }
}
