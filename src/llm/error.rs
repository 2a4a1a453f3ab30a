//! Error types for LLM requests.

use std::fmt;

/// Broad category of an LLM failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection, timeout or other transport-level failure
    Network,
    /// HTTP 429
    RateLimited,
    /// HTTP 5xx
    ServerError,
    /// HTTP 4xx other than 429 (bad key, bad model, bad request)
    ClientError,
    /// The provider answered but the body was not usable
    ParseError,
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Network => "network error",
            Self::RateLimited => "rate limited",
            Self::ServerError => "server error",
            Self::ClientError => "client error",
            Self::ParseError => "parse error",
        };
        f.write_str(s)
    }
}

/// Map an HTTP status code to an error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        500..=599 => LlmErrorKind::ServerError,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}

/// An error returned by an LLM provider.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "{kind}{suffix}: {message}",
    suffix = .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
)]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl LlmError {
    pub fn network_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::Network,
            status: None,
            message,
        }
    }

    pub fn rate_limited(message: String) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            status: Some(429),
            message,
        }
    }

    pub fn server_error(status: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ServerError,
            status: Some(status),
            message,
        }
    }

    pub fn client_error(status: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ClientError,
            status: Some(status),
            message,
        }
    }

    pub fn parse_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::ParseError,
            status: None,
            message,
        }
    }

    /// Whether a caller with a retry policy could reasonably try again.
    ///
    /// This crate never retries; the flag is surfaced in logs only.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            LlmErrorKind::Network | LlmErrorKind::RateLimited | LlmErrorKind::ServerError
        )
    }
}
