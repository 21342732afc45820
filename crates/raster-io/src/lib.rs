//! ASCII raster text import/export for the grid engine.
//!
//! Streams the classic corner-referenced text raster format: a short
//! header (ncols, nrows, xllcorner, yllcorner, cellsize, optional
//! NODATA_value) followed by cell values row-major, highest row first.
//! Import bulk-loads through the grid's `init` path with chunk-row bands
//! pinned and proactive memory checks at band boundaries; export walks
//! `get_cell` row by row with a caller-supplied no-data token.

pub mod error;
pub mod reader;
pub mod writer;

// Re-export commonly used types at the crate root
pub use error::{RasterIoError, Result};
pub use reader::{AsciiGridHeader, AsciiGridReader};
pub use writer::AsciiGridWriter;
