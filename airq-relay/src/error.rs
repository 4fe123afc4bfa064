//! Error types for airq-relay
//!
//! Component errors (`FetchError`, `ExtractError`, `PublishError`) are absorbed
//! by the poller; this type covers startup and the HTTP surface.

use thiserror::Error;

use crate::fetcher::FetchError;

/// Main error type for airq-relay
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration resolution errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors from the shared library
    #[error(transparent)]
    Common(#[from] airq_common::Error),

    /// Feed client could not be built
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),
}

/// Convenience Result type using airq-relay Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_converts() {
        let err: Error = FetchError::Network("TLS backend unavailable".to_string()).into();
        assert!(matches!(err, Error::Fetch(_)));
        assert_eq!(err.to_string(), "Fetch error: Network error: TLS backend unavailable");
    }

    #[test]
    fn test_common_error_is_transparent() {
        let err: Error = airq_common::Error::Config("port must be set".to_string()).into();
        assert_eq!(err.to_string(), "Configuration error: port must be set");
    }
}
