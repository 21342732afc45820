//! Chunk representations and the promotion protocol.
//!
//! A chunk owns a rectangular block of cells in one of three
//! representations:
//!
//! - [`Chunk::Uniform`] - one scalar for every cell, O(1) space
//! - [`Chunk::Dense`] - a row-major array, O(rows × cols) space
//! - [`Chunk::Sparse`] - a default plus per-value overlays
//!
//! Every chunk starts Uniform. The first write of a differing value
//! promotes it in place to the representation selected by the grid's
//! [`ChunkPolicy`]; promotion is one-way and irreversible per instance.

mod dense;
mod sparse;

pub use dense::DenseChunk;
pub use sparse::SparseChunk;

use serde::{Deserialize, Serialize};

use raster_common::CellValue;

use crate::config::PromotionTarget;
use crate::error::{GridError, Result};

/// Chunk representation holding one scalar for every cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformChunk<T> {
    rows: u32,
    cols: u32,
    value: T,
}

impl<T: CellValue> UniformChunk<T> {
    /// The scalar shared by every cell.
    pub fn value(&self) -> T {
        self.value
    }
}

/// Promotion parameters a grid threads into chunk writes.
#[derive(Debug, Clone, Copy)]
pub struct ChunkPolicy<T> {
    /// Representation a Uniform chunk becomes on a differing write.
    pub promotion: PromotionTarget,
    /// Occupancy threshold for the sparse overlay heuristic.
    pub sparse_occupancy: f64,
    /// The grid's no-data sentinel.
    pub no_data: T,
}

/// A rectangular block of cells in one of three representations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Chunk<T> {
    Uniform(UniformChunk<T>),
    Dense(DenseChunk<T>),
    Sparse(SparseChunk<T>),
}

impl<T: CellValue> Chunk<T> {
    /// Create a uniform chunk.
    pub fn uniform(rows: u32, cols: u32, value: T) -> Self {
        Self::Uniform(UniformChunk { rows, cols, value })
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        match self {
            Self::Uniform(u) => u.rows,
            Self::Dense(d) => d.rows(),
            Self::Sparse(s) => s.rows(),
        }
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        match self {
            Self::Uniform(u) => u.cols,
            Self::Dense(d) => d.cols(),
            Self::Sparse(s) => s.cols(),
        }
    }

    /// Total number of cells.
    pub fn len(&self) -> u32 {
        self.rows() * self.cols()
    }

    /// Whether the chunk holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the chunk is still in the uniform representation.
    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform(_))
    }

    /// Read a cell by local coordinates.
    pub fn get(&self, row: u32, col: u32) -> T {
        match self {
            Self::Uniform(u) => {
                assert!(
                    row < u.rows && col < u.cols,
                    "local cell ({row}, {col}) outside {}x{} chunk",
                    u.rows,
                    u.cols
                );
                u.value
            }
            Self::Dense(d) => d.get(row, col),
            Self::Sparse(s) => s.get(row, col),
        }
    }

    /// Write a cell, promoting a Uniform chunk if the value differs.
    /// Returns the prior value.
    pub fn set(&mut self, row: u32, col: u32, value: T, policy: ChunkPolicy<T>) -> T {
        if let Self::Uniform(u) = self {
            assert!(
                row < u.rows && col < u.cols,
                "local cell ({row}, {col}) outside {}x{} chunk",
                u.rows,
                u.cols
            );
            if value == u.value {
                return u.value;
            }
            self.promote(policy);
            // Now Dense or Sparse; fall through to the direct write.
        }
        match self {
            Self::Uniform(_) => unreachable!("promotion always replaces the variant"),
            Self::Dense(d) => d.set(row, col, value),
            Self::Sparse(s) => s.set(row, col, value),
        }
    }

    /// Write a cell without permitting promotion.
    ///
    /// A differing write to a Uniform chunk is an [`GridError::UnsupportedMutation`].
    pub fn try_set(&mut self, row: u32, col: u32, value: T) -> Result<T> {
        match self {
            Self::Uniform(u) => {
                if value == u.value {
                    Ok(u.value)
                } else {
                    Err(GridError::unsupported_mutation(format!(
                        "differing write to uniform {}x{} chunk on a non-promoting path",
                        u.rows, u.cols
                    )))
                }
            }
            Self::Dense(d) => Ok(d.set(row, col, value)),
            Self::Sparse(s) => Ok(s.set(row, col, value)),
        }
    }

    /// Bulk-construction write: identical to [`Chunk::set`] but the prior
    /// value is discarded and callers must not feed the result into
    /// statistics.
    pub fn init(&mut self, row: u32, col: u32, value: T, policy: ChunkPolicy<T>) {
        self.set(row, col, value, policy);
    }

    /// Replace a Uniform variant with the policy's promotion target,
    /// conceptually copying the uniform value into every cell. No-op for
    /// already-promoted chunks.
    fn promote(&mut self, policy: ChunkPolicy<T>) {
        if let Self::Uniform(u) = self {
            *self = match policy.promotion {
                PromotionTarget::Dense => {
                    Self::Dense(DenseChunk::filled(u.rows, u.cols, u.value))
                }
                PromotionTarget::Sparse => Self::Sparse(SparseChunk::with_default(
                    u.rows,
                    u.cols,
                    u.value,
                    policy.no_data,
                    policy.sparse_occupancy,
                )),
            };
        }
    }

    /// Heap bytes owned by the representation. Uniform chunks own none.
    pub fn heap_bytes(&self) -> usize {
        match self {
            Self::Uniform(_) => 0,
            Self::Dense(d) => d.heap_bytes(),
            Self::Sparse(s) => s.heap_bytes(),
        }
    }

    /// Row-major iterator over every cell value.
    pub fn values(&self) -> ChunkValues<'_, T> {
        ChunkValues {
            chunk: self,
            idx: 0,
            len: self.len(),
        }
    }
}

/// Row-major iterator over a chunk's cell values.
pub struct ChunkValues<'a, T> {
    chunk: &'a Chunk<T>,
    idx: u32,
    len: u32,
}

impl<T: CellValue> Iterator for ChunkValues<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.idx >= self.len {
            return None;
        }
        let cols = self.chunk.cols();
        let value = self.chunk.get(self.idx / cols, self.idx % cols);
        self.idx += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.len - self.idx) as usize;
        (remaining, Some(remaining))
    }
}
