//! Lazy forward-only traversal of every cell value.

use chunk_store::ChunkStore;
use raster_common::{CellValue, ChunkId};

use crate::error::Result;
use crate::grid::Grid;

/// Iterator over every cell value of a grid.
///
/// Order is chunk-by-chunk (row-major over the chunk lattice) and
/// row-major within each chunk. Chunks that were never materialized yield
/// the no-data sentinel for each of their cells without being created;
/// evicted chunks are reloaded transparently on entry, which is why each
/// item is a `Result`. The iterator is finite and forward-only; restart
/// by asking the grid for a new one.
pub struct CellIterator<'g, T: CellValue, S: ChunkStore> {
    grid: &'g mut Grid<T, S>,
    lattice: Vec<ChunkId>,
    chunk_idx: usize,
    cell_idx: u32,
    shape: (u32, u32),
}

impl<'g, T: CellValue, S: ChunkStore> CellIterator<'g, T, S> {
    pub(crate) fn new(grid: &'g mut Grid<T, S>) -> Self {
        let (chunk_rows, chunk_cols) = grid.geometry().num_chunks();
        let mut lattice = Vec::with_capacity((chunk_rows * chunk_cols) as usize);
        for row in 0..chunk_rows {
            for col in 0..chunk_cols {
                lattice.push(ChunkId::new(row, col));
            }
        }
        Self {
            grid,
            lattice,
            chunk_idx: 0,
            cell_idx: 0,
            shape: (0, 0),
        }
    }

    /// Prepare the chunk at `chunk_idx` for reading.
    fn enter_chunk(&mut self) -> Result<()> {
        let id = self.lattice[self.chunk_idx];
        self.shape = self.grid.geometry().chunk_shape(id).unwrap_or((0, 0));
        if self.grid.is_materialized(id) {
            // Reload if evicted; resident chunks are untouched.
            self.grid.load_chunk(id)?;
        }
        Ok(())
    }
}

impl<T: CellValue, S: ChunkStore> Iterator for CellIterator<'_, T, S> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.chunk_idx >= self.lattice.len() {
                return None;
            }
            if self.cell_idx == 0 {
                if let Err(e) = self.enter_chunk() {
                    // Skip past the failing chunk so the iterator stays
                    // forward-only instead of erroring forever.
                    self.chunk_idx += 1;
                    return Some(Err(e));
                }
            }
            let (rows, cols) = self.shape;
            if self.cell_idx >= rows * cols {
                self.chunk_idx += 1;
                self.cell_idx = 0;
                continue;
            }
            let id = self.lattice[self.chunk_idx];
            let value = match self.grid.chunk(id) {
                Some(chunk) => chunk.get(self.cell_idx / cols, self.cell_idx % cols),
                None => self.grid.no_data(),
            };
            self.cell_idx += 1;
            return Some(Ok(value));
        }
    }
}
