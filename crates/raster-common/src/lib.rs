//! Shared types for the raster-store workspace.
//!
//! This crate holds the leaf types every other crate builds on:
//! - [`CellId`] / [`ChunkId`] coordinate pairs
//! - [`GridGeometry`] for extents, chunk addressing, and georeferencing
//! - the [`CellValue`] trait abstracting over the supported cell types

pub mod geometry;
pub mod ids;
pub mod value;

// Re-export commonly used types at the crate root
pub use geometry::GridGeometry;
pub use ids::{CellId, ChunkId};
pub use value::CellValue;
