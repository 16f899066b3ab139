//! Error taxonomy for the I/O collaborators.
//!
//! The extraction core never fails; everything here comes from fetching the
//! feed, fetching article pages, reading configuration, or writing output.
//! Each variant maps to a stable [`IntelError::kind`] string that the CLI
//! reports in its structured error payload.

use thiserror::Error;

/// Errors raised while fetching, parsing, configuring, or exporting.
#[derive(Debug, Error)]
pub enum IntelError {
    /// Connection, timeout, TLS or body-read failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server refused the request (401/403).
    #[error("access denied (HTTP {status}) for {url}")]
    AccessDenied { status: u16, url: String },

    /// The server asked us to slow down (429).
    #[error("rate limited (HTTP {status}) for {url}")]
    RateLimited { status: u16, url: String },

    /// Any other non-success status.
    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// The feed body is not well-formed XML.
    #[error("feed parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("vocabulary file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl IntelError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, url: &str) -> Self {
        let url = url.to_string();
        match status {
            401 | 403 => IntelError::AccessDenied { status, url },
            429 => IntelError::RateLimited { status, url },
            _ => IntelError::Http { status, url },
        }
    }

    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            IntelError::Network(_) => "network_error",
            IntelError::AccessDenied { .. } => "access_denied",
            IntelError::RateLimited { .. } => "rate_limited",
            IntelError::Http { .. } => "http_error",
            IntelError::Parse(_) => "parse_error",
            IntelError::Io(_) => "io_error",
            IntelError::Json(_) => "serialization_error",
            IntelError::Yaml(_) | IntelError::Config(_) => "config_error",
        }
    }

    /// Whether another attempt might succeed: network failures, 429 and 5xx.
    pub fn is_retriable(&self) -> bool {
        match self {
            IntelError::Network(e) => !e.is_builder() && !e.is_decode(),
            IntelError::RateLimited { .. } => true,
            IntelError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        let url = "https://techcrunch.com/feed/";
        assert_eq!(IntelError::from_status(401, url).kind(), "access_denied");
        assert_eq!(IntelError::from_status(403, url).kind(), "access_denied");
        assert_eq!(IntelError::from_status(429, url).kind(), "rate_limited");
        assert_eq!(IntelError::from_status(404, url).kind(), "http_error");
        assert_eq!(IntelError::from_status(502, url).kind(), "http_error");
    }

    #[test]
    fn test_retriable_statuses() {
        let url = "https://techcrunch.com/feed/";
        assert!(IntelError::from_status(429, url).is_retriable());
        assert!(IntelError::from_status(503, url).is_retriable());
        assert!(!IntelError::from_status(403, url).is_retriable());
        assert!(!IntelError::from_status(404, url).is_retriable());
        assert!(!IntelError::Config("bad".into()).is_retriable());
    }

    #[test]
    fn test_error_display_includes_url() {
        let e = IntelError::from_status(404, "https://example.com/x");
        assert_eq!(e.to_string(), "HTTP 404 for https://example.com/x");
    }
}
