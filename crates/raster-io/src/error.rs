//! Error types for raster text import/export.

use thiserror::Error;

/// Errors that can occur during raster import/export.
#[derive(Error, Debug)]
pub enum RasterIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("missing header field: {0}")]
    MissingHeader(String),

    #[error("grid error: {0}")]
    Grid(#[from] raster_grid::GridError),
}

impl RasterIoError {
    /// Create a MalformedInput error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }
}

/// Result type for raster import/export operations.
pub type Result<T> = std::result::Result<T, RasterIoError>;
