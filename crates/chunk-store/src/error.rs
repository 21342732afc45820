//! Error types for the chunk store.

use thiserror::Error;

/// Errors that can occur while persisting or loading chunks.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid spill directory: {0}")]
    InvalidRoot(String),
}

/// Result type for chunk store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
