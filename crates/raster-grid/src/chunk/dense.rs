//! Dense chunk: a row-major 2-D array.

use serde::{Deserialize, Serialize};

use raster_common::CellValue;

/// Chunk representation holding every cell explicitly.
///
/// O(rows × cols) space, independent per-cell mutation, no further
/// promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseChunk<T> {
    rows: u32,
    cols: u32,
    cells: Vec<T>,
}

impl<T: CellValue> DenseChunk<T> {
    /// Create a dense chunk with every cell set to `value`.
    pub fn filled(rows: u32, cols: u32, value: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows as usize * cols as usize],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    fn index(&self, row: u32, col: u32) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "local cell ({row}, {col}) outside {}x{} chunk",
            self.rows,
            self.cols
        );
        row as usize * self.cols as usize + col as usize
    }

    /// Read a cell.
    pub fn get(&self, row: u32, col: u32) -> T {
        self.cells[self.index(row, col)]
    }

    /// Write a cell, returning the prior value.
    pub fn set(&mut self, row: u32, col: u32, value: T) -> T {
        let idx = self.index(row, col);
        std::mem::replace(&mut self.cells[idx], value)
    }

    /// Heap bytes owned by the cell array.
    pub fn heap_bytes(&self) -> usize {
        self.cells.len() * std::mem::size_of::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_and_set() {
        let mut chunk = DenseChunk::filled(4, 3, 0.0f64);
        assert_eq!(chunk.get(3, 2), 0.0);
        assert_eq!(chunk.set(1, 2, 7.5), 0.0);
        assert_eq!(chunk.set(1, 2, 8.5), 7.5);
        assert_eq!(chunk.get(1, 2), 8.5);
        assert_eq!(chunk.get(1, 1), 0.0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_panics() {
        let chunk = DenseChunk::filled(2, 2, 0i64);
        chunk.get(2, 0);
    }

    #[test]
    fn test_heap_bytes() {
        let chunk = DenseChunk::filled(8, 8, 0.0f64);
        assert_eq!(chunk.heap_bytes(), 64 * 8);
    }
}
