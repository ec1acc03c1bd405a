//! Error types for upstream fetches and startup configuration.

use thiserror::Error;

/// Errors that can occur while fetching one of the upstream resources.
///
/// Every variant carries the URL so the poll loop can log the failure
/// without extra context.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection failure, timeout or other transport-level error.
    #[error("GET {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The upstream answered with a non-success HTTP status.
    #[error("GET {url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    /// The body was not JSON of the expected shape.
    #[error("malformed response from {url}: {reason}")]
    Protocol { url: String, reason: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Protocol { url, .. } => url,
        }
    }
}

/// Errors raised while loading [`crate::config::ExporterConfig`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_messages_include_url() {
        let err = FetchError::Status {
            url: "http://localhost:8090/health".to_string(),
            status: 503,
        };
        assert_eq!(err.url(), "http://localhost:8090/health");
        assert_eq!(
            err.to_string(),
            "GET http://localhost:8090/health returned HTTP status 503"
        );
    }
}
