//! Error types for the field store.

use thiserror::Error;

/// Main error type for store operations.
///
/// Only malformed input is an error. A DELETE that misses and a RESTORE
/// with an unknown index are ordinary `"false"` outputs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown operation: {0:?}")]
    UnknownOperation(String),

    #[error("Malformed {tag} record: expected {expected} tokens, got {got}")]
    MalformedRecord {
        tag: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid {name} in {tag} record: {value:?}")]
    InvalidInteger {
        tag: String,
        name: &'static str,
        value: String,
    },

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Deserialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
