//! Error types for the search tooling.
//!
//! Every fallible operation in this crate returns [`Result`], whose error type is
//! [`DeployerError`]. Errors reported by the search engine are carried through
//! unmodified so that callers see the engine's own reason.
//!
//! # Examples
//!
//! ```
//! use yari_search::error::{DeployerError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(DeployerError::validation("title is required"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => assert!(!e.is_retryable()),
//! }
//! ```

use thiserror::Error;

/// The main error type for search and deployer operations.
#[derive(Error, Debug)]
pub enum DeployerError {
    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis configuration errors (unknown filters, invalid patterns, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A document does not conform to the index mapping.
    ///
    /// This is a per-document failure and is never retryable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The target index does not exist
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// The index already exists
    #[error("Index already exists: {0}")]
    IndexExists(String),

    /// The index was created with different analysis settings and must be rebuilt.
    #[error(
        "Index {index} was built with analysis settings {found}, current settings are {expected}; rebuild the index"
    )]
    ReindexRequired {
        /// Index name.
        index: String,
        /// Fingerprint of the settings this process would create the index with.
        expected: String,
        /// Fingerprint recorded in the existing index, if any.
        found: String,
    },

    /// An error reported by the search engine, with the engine's reason.
    #[error("Engine error ({status}): {reason}")]
    Engine {
        /// HTTP status (or 400 for local configuration errors).
        status: u16,
        /// The engine's own error reason.
        reason: String,
    },

    /// The search engine could not be reached (connection failure, timeout).
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors that are not connection or timeout failures
    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result type alias for operations that may fail with [`DeployerError`].
pub type Result<T> = std::result::Result<T, DeployerError>;

impl DeployerError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DeployerError::Config(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        DeployerError::Analysis(msg.into())
    }

    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        DeployerError::Validation(msg.into())
    }

    /// Create a new engine error.
    pub fn engine<S: Into<String>>(status: u16, reason: S) -> Self {
        DeployerError::Engine {
            status,
            reason: reason.into(),
        }
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Only availability problems and engine-side 5xx/429 responses qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeployerError::Unavailable(_) => true,
            DeployerError::Engine { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DeployerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            DeployerError::Unavailable(err.to_string())
        } else {
            DeployerError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = DeployerError::config("replicas must be a number");
        assert_eq!(error.to_string(), "Configuration error: replicas must be a number");

        let error = DeployerError::analysis("unknown token filter [nope]");
        assert_eq!(
            error.to_string(),
            "Analysis error: unknown token filter [nope]"
        );

        let error = DeployerError::engine(400, "mapper_parsing_exception");
        assert_eq!(
            error.to_string(),
            "Engine error (400): mapper_parsing_exception"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(DeployerError::Unavailable("connection refused".to_string()).is_retryable());
        assert!(DeployerError::engine(503, "unavailable_shards").is_retryable());
        assert!(DeployerError::engine(429, "too many requests").is_retryable());
        assert!(!DeployerError::engine(400, "bad request").is_retryable());
        assert!(!DeployerError::validation("title is required").is_retryable());
        assert!(!DeployerError::Http("builder error".to_string()).is_retryable());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = DeployerError::from(json_error);

        match error {
            DeployerError::Json(_) => {}
            _ => panic!("Expected JSON error variant"),
        }
    }
}
