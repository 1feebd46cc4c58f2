//! # Errors
//!
//! Centralized error handling for the forum store.
//! Storage failures are kept apart from domain failures so callers can tell
//! a rejected draft from a full disk.

use thiserror::Error;

/// Failures raised by a `KvStore` backing.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backing refused a write because it would grow past its limit.
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// The primary error type for all store operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Resource not found (e.g., Post)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., empty title)
    #[error("validation error: {0}")]
    Validation(String),

    /// Write to the backing failed; reads never produce this.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A specialized Result type for forum logic.
pub type Result<T> = std::result::Result<T, DomainError>;
