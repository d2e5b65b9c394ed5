//! Error types for the bridge
//!
//! Library code returns [`BridgeError`]; the fail-soft entry points
//! (`current_schema`, `execute_query`, `generate_sql`) turn these into
//! empty results or displayable text instead of propagating them.

use thiserror::Error;

/// Errors that can occur while talking to the database or the LLM
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A database connection or catalog query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The HTTP request to the inference server failed (transport, timeout, decode)
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The inference server answered with a non-success status
    #[error("LLM server returned {status}: {body}")]
    LlmStatus {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Caller-supplied input was rejected before reaching the database
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
