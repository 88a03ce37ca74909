//! Error types for the networking module.

use std::fmt;

use serde::Deserialize;

/// Message shown for any 5xx response, whatever the body says.
pub const SERVER_ERROR_MESSAGE: &str =
    "Something went wrong on our side. Please try again later.";

/// Message shown when the backend could not be reached at all.
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";

/// Network-specific errors.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// HTTP request failed for a reason other than connect/timeout.
    Request(String),
    /// Invalid URL provided.
    InvalidUrl(String),
    /// Request timed out.
    Timeout,
    /// Connection refused or failed.
    Connection(String),
    /// Invalid header name or value.
    InvalidHeader(String),
    /// JSON serialization/deserialization error.
    Json(String),
    /// I/O error.
    Io(String),
    /// Client error status (4xx).
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Message from the `{ "error": { "message" } }` body, if present.
        message: Option<String>,
    },
    /// Server error status (5xx). The body is never shown to users.
    Server {
        /// The HTTP status code.
        status: u16,
    },
    /// A body was expected but the backend answered 204 No Content.
    EmptyBody,
}

impl NetworkError {
    /// Map a non-2xx status and its raw body to a typed error.
    pub fn from_status(status: u16, body: &str) -> Self {
        if (500..600).contains(&status) {
            return Self::Server { status };
        }
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.message)
            .filter(|m| !m.trim().is_empty());
        Self::HttpStatus { status, message }
    }

    /// The HTTP status, for status-derived errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } | Self::Server { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error came from a 5xx response.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Whether the backend could not be reached.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }

    /// Text suitable for an inline error next to the control that failed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { .. } => SERVER_ERROR_MESSAGE.to_string(),
            Self::Connection(_) | Self::Timeout => CONNECTION_ERROR_MESSAGE.to_string(),
            Self::HttpStatus {
                message: Some(msg), ..
            } => msg.clone(),
            Self::HttpStatus {
                status,
                message: None,
            } => format!("Request failed with status {status}"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(msg) => write!(f, "HTTP request error: {msg}"),
            Self::InvalidUrl(msg) => write!(f, "Invalid URL: {msg}"),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Connection(msg) => write!(f, "Connection error: {msg}"),
            Self::InvalidHeader(msg) => write!(f, "Invalid header: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::HttpStatus { status, message } => {
                if let Some(msg) = message {
                    write!(f, "HTTP {status}: {msg}")
                } else {
                    write!(f, "HTTP {status}")
                }
            }
            Self::Server { status } => write!(f, "HTTP {status}: server error"),
            Self::EmptyBody => write!(f, "Expected a response body but got none"),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_decode() {
            Self::Json(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<std::io::Error> for NetworkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for NetworkError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for NetworkError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// Backend error envelope: `{ "error": { "message": "..." } }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// A specialized Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_uses_backend_message() {
        let err = NetworkError::from_status(422, r#"{"error":{"message":"Name already taken"}}"#);
        assert_eq!(
            err,
            NetworkError::HttpStatus {
                status: 422,
                message: Some("Name already taken".to_string())
            }
        );
        assert_eq!(err.user_message(), "Name already taken");
    }

    #[test]
    fn test_client_error_without_envelope() {
        let err = NetworkError::from_status(404, "<html>not found</html>");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message(), "Request failed with status 404");

        let blank = NetworkError::from_status(400, r#"{"error":{"message":"  "}}"#);
        assert_eq!(
            blank,
            NetworkError::HttpStatus {
                status: 400,
                message: None
            }
        );
    }

    #[test]
    fn test_server_error_hides_body() {
        let err = NetworkError::from_status(503, r#"{"error":{"message":"db pool exhausted"}}"#);
        assert!(err.is_server_error());
        assert_eq!(err.user_message(), SERVER_ERROR_MESSAGE);
        assert!(!err.to_string().contains("db pool"));
    }

    #[test]
    fn test_connection_errors_share_message() {
        assert_eq!(NetworkError::Timeout.user_message(), CONNECTION_ERROR_MESSAGE);
        assert!(NetworkError::Connection("refused".into()).is_connection_error());
    }
}
