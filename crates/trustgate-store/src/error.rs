//! Error types for the behavioral state store.

use thiserror::Error;

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The embedded database rejected or failed an operation.
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    /// A log entry could not be serialized or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record could not be decoded.
    #[error("corrupt record under key '{key}'")]
    Corrupt { key: String },

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn corrupt(tree: &str, key: &str) -> Self {
        Self::Corrupt {
            key: format!("{tree}/{key}"),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
