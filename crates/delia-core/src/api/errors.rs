use std::fmt;

use serde_json::Value;

/// Failure of a backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// HTTP 401: the token is missing, expired or revoked.
    Unauthorized,
    /// Any other non-success status.
    Status { status: u16, body: String },
    /// Connection, TLS or timeout failure.
    Transport(String),
    /// The body did not match the expected shape.
    Decode(String),
    /// Upload rejected before sending: unsupported file extension.
    UnsupportedFile(String),
    /// Local file could not be read.
    Io(String),
}

impl ApiError {
    pub fn status(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }
        ApiError::Status {
            status,
            body: body.to_string(),
        }
    }

    pub fn transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport(format!("request timed out: {err}"))
        } else {
            ApiError::Transport(err.to_string())
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Backend detail message, if the body is a FastAPI-style `{"detail": "..."}`.
    fn detail(body: &str) -> Option<String> {
        let json: Value = serde_json::from_str(body).ok()?;
        json.get("detail")?.as_str().map(ToString::to_string)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "not authorized (HTTP 401)"),
            ApiError::Status { status, body } => match Self::detail(body) {
                Some(detail) => write!(f, "HTTP {status}: {detail}"),
                None if body.is_empty() => write!(f, "HTTP {status}"),
                None => write!(f, "HTTP {status}: {body}"),
            },
            ApiError::Transport(msg) => write!(f, "connection failed: {msg}"),
            ApiError::Decode(msg) => write!(f, "unexpected response: {msg}"),
            ApiError::UnsupportedFile(name) => write!(
                f,
                "unsupported file '{name}' (allowed: .pdf, .txt, .json, .xlsx)"
            ),
            ApiError::Io(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_maps_to_unauthorized() {
        assert_eq!(ApiError::status(401, "nope"), ApiError::Unauthorized);
        assert!(ApiError::status(401, "").is_unauthorized());
        assert!(!ApiError::status(500, "").is_unauthorized());
    }

    #[test]
    fn test_status_display_prefers_detail() {
        let err = ApiError::status(400, r#"{"detail": "Incorrect username or password"}"#);
        assert_eq!(err.to_string(), "HTTP 400: Incorrect username or password");

        assert_eq!(ApiError::status(503, "").to_string(), "HTTP 503");
        assert_eq!(
            ApiError::status(500, "boom").to_string(),
            "HTTP 500: boom"
        );
    }
}
