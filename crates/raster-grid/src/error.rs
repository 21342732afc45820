//! Error types for the grid engine.

use thiserror::Error;

use raster_common::ChunkId;

/// Errors that can occur during grid operations.
#[derive(Error, Debug)]
pub enum GridError {
    /// Memory pressure could not be relieved: no evictable chunk remains.
    #[error("memory exhausted: {0}")]
    ResourceExhausted(String),

    /// A write reached a chunk through a path that forbids promotion.
    #[error("unsupported mutation: {0}")]
    UnsupportedMutation(String),

    /// The backing chunk store failed.
    #[error("chunk store error: {0}")]
    Store(#[from] chunk_store::StoreError),

    /// A persisted chunk payload could not be decoded.
    #[error("chunk serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A chunk recorded as evicted is missing from the store.
    #[error("chunk {0} is missing from the backing store")]
    MissingChunk(ChunkId),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GridError {
    /// Create a ResourceExhausted error.
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Create an UnsupportedMutation error.
    pub fn unsupported_mutation(msg: impl Into<String>) -> Self {
        Self::UnsupportedMutation(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
