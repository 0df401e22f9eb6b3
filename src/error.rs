//! Error types for site-harvest
//!
//! Fetch failures are not errors: they are classified into
//! [`ErrorKind`](crate::types::ErrorKind) and reported through
//! [`FetchOutcome`](crate::types::FetchOutcome). The types here cover the
//! failures that do end a run: bad configuration and a failed write.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for site-harvest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for site-harvest
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetch.max_attempts")
        key: Option<String>,
    },

    /// An endpoint address could not be accepted
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be constructed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the result file failed
    #[error("write error: {0}")]
    Write(#[from] WriteError),
}

/// Result writer errors
///
/// Any of these means no output file was produced for the run.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Destination (or its temporary sibling) could not be created
    #[error("cannot open {path}: {source}")]
    Open {
        /// The path that could not be opened
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A payload is not valid UTF-8 text
    #[error("payload from {endpoint} is not valid UTF-8")]
    Encoding {
        /// The endpoint whose payload failed to encode
        endpoint: String,
    },

    /// CSV serialization failed
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// The finished file could not be moved into place
    #[error("cannot persist {path}: {source}")]
    Persist {
        /// The final destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Shorthand for a configuration error tied to a key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
