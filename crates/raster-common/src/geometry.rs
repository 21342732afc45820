//! Grid extents, chunk addressing, and georeferencing.

use serde::{Deserialize, Serialize};

use crate::ids::{CellId, ChunkId};

/// Shape and placement of a regular raster grid.
///
/// Rows run top-to-bottom (row 0 is the northernmost row), matching the
/// row-major, highest-row-first order of the text raster format. The lower
/// left corner of the grid sits at (`xllcorner`, `yllcorner`) and cells are
/// square with side `cellsize`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Total number of rows in the grid.
    pub rows: i64,
    /// Total number of columns in the grid.
    pub cols: i64,
    /// Rows per chunk (the final chunk row may be smaller).
    pub chunk_rows: i64,
    /// Columns per chunk (the final chunk column may be smaller).
    pub chunk_cols: i64,
    /// X coordinate of the lower left grid corner.
    pub xllcorner: f64,
    /// Y coordinate of the lower left grid corner.
    pub yllcorner: f64,
    /// Cell side length in world units.
    pub cellsize: f64,
}

impl GridGeometry {
    /// Create a geometry with the origin at (0, 0) and unit cells.
    pub fn new(rows: i64, cols: i64, chunk_rows: i64, chunk_cols: i64) -> Self {
        Self {
            rows,
            cols,
            chunk_rows,
            chunk_cols,
            xllcorner: 0.0,
            yllcorner: 0.0,
            cellsize: 1.0,
        }
    }

    /// Place the lower left corner and set the cell size.
    pub fn with_origin(mut self, xllcorner: f64, yllcorner: f64, cellsize: f64) -> Self {
        self.xllcorner = xllcorner;
        self.yllcorner = yllcorner;
        self.cellsize = cellsize;
        self
    }

    /// Total number of cells in the grid.
    pub fn len(&self) -> i64 {
        self.rows * self.cols
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Whether a global cell coordinate lies inside the grid.
    pub fn contains(&self, row: i64, col: i64) -> bool {
        row >= 0 && row < self.rows && col >= 0 && col < self.cols
    }

    /// Chunk holding a global cell coordinate.
    ///
    /// Floor division keeps the mapping deterministic for negative
    /// coordinates: cell (-1, -1) belongs to chunk (-1, -1), not (0, 0).
    pub fn chunk_of(&self, row: i64, col: i64) -> ChunkId {
        ChunkId::new(row.div_euclid(self.chunk_rows), col.div_euclid(self.chunk_cols))
    }

    /// Local (row, col) of a global cell within its chunk.
    pub fn local_of(&self, row: i64, col: i64) -> (u32, u32) {
        (
            row.rem_euclid(self.chunk_rows) as u32,
            col.rem_euclid(self.chunk_cols) as u32,
        )
    }

    /// Number of chunks along each axis (rows, cols).
    pub fn num_chunks(&self) -> (i64, i64) {
        (
            (self.rows + self.chunk_rows - 1) / self.chunk_rows,
            (self.cols + self.chunk_cols - 1) / self.chunk_cols,
        )
    }

    /// Shape (rows, cols) of a chunk, accounting for smaller edge chunks.
    ///
    /// Returns `None` for chunk positions outside the lattice.
    pub fn chunk_shape(&self, id: ChunkId) -> Option<(u32, u32)> {
        let (chunks_r, chunks_c) = self.num_chunks();
        if id.row < 0 || id.row >= chunks_r || id.col < 0 || id.col >= chunks_c {
            return None;
        }
        let rows = (self.rows - id.row * self.chunk_rows).min(self.chunk_rows);
        let cols = (self.cols - id.col * self.chunk_cols).min(self.chunk_cols);
        Some((rows as u32, cols as u32))
    }

    /// Global cell coordinate of a chunk's top left cell.
    pub fn chunk_origin(&self, id: ChunkId) -> (i64, i64) {
        (id.row * self.chunk_rows, id.col * self.chunk_cols)
    }

    /// World coordinates of a cell centroid.
    pub fn cell_to_coords(&self, row: i64, col: i64) -> (f64, f64) {
        let x = self.xllcorner + (col as f64 + 0.5) * self.cellsize;
        let y = self.yllcorner + (self.rows as f64 - row as f64 - 0.5) * self.cellsize;
        (x, y)
    }

    /// Cell containing a world coordinate, if inside the grid.
    pub fn coords_to_cell(&self, x: f64, y: f64) -> Option<CellId> {
        let col = ((x - self.xllcorner) / self.cellsize).floor() as i64;
        let row = self.rows - 1 - ((y - self.yllcorner) / self.cellsize).floor() as i64;
        if self.contains(row, col) {
            Some(CellId::new(row, col))
        } else {
            None
        }
    }

    /// Cell nearest to a world coordinate, clamped into the grid.
    pub fn nearest_cell(&self, x: f64, y: f64) -> CellId {
        let col = ((x - self.xllcorner) / self.cellsize).floor() as i64;
        let row = self.rows - 1 - ((y - self.yllcorner) / self.cellsize).floor() as i64;
        CellId::new(
            row.clamp(0, self.rows.max(1) - 1),
            col.clamp(0, self.cols.max(1) - 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_addressing() {
        let geom = GridGeometry::new(100, 100, 32, 32);
        assert_eq!(geom.chunk_of(0, 0), ChunkId::new(0, 0));
        assert_eq!(geom.chunk_of(31, 31), ChunkId::new(0, 0));
        assert_eq!(geom.chunk_of(32, 0), ChunkId::new(1, 0));
        assert_eq!(geom.local_of(33, 65), (1, 1));
    }

    #[test]
    fn test_chunk_addressing_negative_coords() {
        let geom = GridGeometry::new(100, 100, 32, 32);
        // Floor semantics: -1 maps into chunk -1, local index at the far edge.
        assert_eq!(geom.chunk_of(-1, -1), ChunkId::new(-1, -1));
        assert_eq!(geom.local_of(-1, -1), (31, 31));
        assert_eq!(geom.chunk_of(-33, 5), ChunkId::new(-2, 0));
    }

    #[test]
    fn test_edge_chunk_shape() {
        let geom = GridGeometry::new(100, 70, 32, 32);
        assert_eq!(geom.num_chunks(), (4, 3));
        assert_eq!(geom.chunk_shape(ChunkId::new(0, 0)), Some((32, 32)));
        assert_eq!(geom.chunk_shape(ChunkId::new(3, 2)), Some((4, 6)));
        assert_eq!(geom.chunk_shape(ChunkId::new(4, 0)), None);
        assert_eq!(geom.chunk_shape(ChunkId::new(-1, 0)), None);
    }

    #[test]
    fn test_contains() {
        let geom = GridGeometry::new(5, 5, 2, 2);
        assert!(geom.contains(0, 0));
        assert!(geom.contains(4, 4));
        assert!(!geom.contains(-1, -1));
        assert!(!geom.contains(5, 5));
    }

    #[test]
    fn test_coords_round_trip() {
        let geom = GridGeometry::new(10, 20, 4, 4).with_origin(100.0, 200.0, 0.5);
        let (x, y) = geom.cell_to_coords(0, 0);
        assert_eq!(geom.coords_to_cell(x, y), Some(CellId::new(0, 0)));
        let (x, y) = geom.cell_to_coords(9, 19);
        assert_eq!(geom.coords_to_cell(x, y), Some(CellId::new(9, 19)));
        assert_eq!(geom.coords_to_cell(99.0, 200.0), None);
    }

    #[test]
    fn test_nearest_cell_clamps() {
        let geom = GridGeometry::new(5, 5, 2, 2);
        assert_eq!(geom.nearest_cell(-10.0, -10.0), CellId::new(4, 0));
        assert_eq!(geom.nearest_cell(100.0, 100.0), CellId::new(0, 4));
        assert_eq!(geom.nearest_cell(0.5, 4.5), CellId::new(0, 0));
    }
}
