//! Nearest-populated-cell search.
//!
//! Two phases. A ring-expansion BFS walks outward over 8-neighborhoods
//! until a ring contains at least one data cell; the minimal exact
//! centroid distance among those hits bounds the answer. Because a nearer
//! cell can sit inside the disc of that radius but outside the square
//! rings scanned so far, a second pass enumerates every cell whose
//! centroid lies within the bound and folds closer-or-equal discoveries
//! into the result. All cells at the strictly minimal distance are
//! returned; scan order never picks a winner.

use std::collections::HashSet;

use chunk_store::ChunkStore;
use raster_common::{CellId, CellValue};

use crate::error::Result;
use crate::grid::Grid;

/// Tolerance for comparing squared cell distances.
const DISTANCE_EPSILON: f64 = 1e-9;

/// All equally-nearest data cells and their distance in world units.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestResult {
    /// Every cell at the minimal distance, row-major order.
    pub cells: Vec<CellId>,
    /// Centroid distance from the query cell, in world units.
    pub distance: f64,
}

const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl<T: CellValue, S: ChunkStore> Grid<T, S> {
    /// Nearest data cells to a world coordinate.
    ///
    /// The coordinate is resolved to the nearest grid cell (clamped into
    /// bounds) and the search proceeds from there.
    pub fn nearest_data(&mut self, x: f64, y: f64) -> Result<Option<NearestResult>> {
        let origin = self.geometry().nearest_cell(x, y);
        self.nearest_data_from_cell(origin.row, origin.col)
    }

    /// Nearest data cells to a cell coordinate.
    ///
    /// Returns the cell itself at distance 0 when it holds data, the set
    /// of equally-nearest data cells otherwise, or `None` when the grid
    /// holds no data at all. Never materializes chunks.
    pub fn nearest_data_from_cell(&mut self, row: i64, col: i64) -> Result<Option<NearestResult>> {
        let geometry = *self.geometry();
        if geometry.is_empty() {
            return Ok(None);
        }
        let origin = CellId::new(
            row.clamp(0, geometry.rows - 1),
            col.clamp(0, geometry.cols - 1),
        );

        if self.has_data(origin)? {
            return Ok(Some(NearestResult {
                cells: vec![origin],
                distance: 0.0,
            }));
        }

        let mut visited: HashSet<CellId> = HashSet::new();
        visited.insert(origin);
        let mut ring: Vec<CellId> = Vec::new();
        for (dr, dc) in NEIGHBORS {
            let cell = CellId::new(origin.row + dr, origin.col + dc);
            if geometry.contains(cell.row, cell.col) && visited.insert(cell) {
                ring.push(cell);
            }
        }

        while !ring.is_empty() {
            // Phase one: the first ring holding any data bounds the answer.
            let mut best_sq = f64::INFINITY;
            for &cell in &ring {
                if self.has_data(cell)? {
                    best_sq = best_sq.min(cell_distance_sq(origin, cell));
                }
            }
            if best_sq.is_finite() {
                return Ok(Some(self.rescan_disc(origin, best_sq)?));
            }

            // Next ring: newly reachable unvisited 8-neighbors.
            let mut next = Vec::new();
            for &cell in &ring {
                for (dr, dc) in NEIGHBORS {
                    let neighbor = CellId::new(cell.row + dr, cell.col + dc);
                    if geometry.contains(neighbor.row, neighbor.col) && visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            ring = next;
        }

        Ok(None)
    }

    /// Phase two: enumerate every cell whose centroid lies within the
    /// current bound and keep the strictly-minimal set.
    fn rescan_disc(&mut self, origin: CellId, bound_sq: f64) -> Result<NearestResult> {
        let geometry = *self.geometry();
        let radius = bound_sq.sqrt().ceil() as i64;
        let mut best_sq = bound_sq;
        let mut cells: Vec<CellId> = Vec::new();

        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let cell = CellId::new(origin.row + dr, origin.col + dc);
                if !geometry.contains(cell.row, cell.col) {
                    continue;
                }
                let d_sq = (dr * dr + dc * dc) as f64;
                if d_sq > best_sq + DISTANCE_EPSILON {
                    continue;
                }
                if !self.has_data(cell)? {
                    continue;
                }
                if d_sq < best_sq - DISTANCE_EPSILON {
                    best_sq = d_sq;
                    cells.clear();
                }
                cells.push(cell);
            }
        }

        // Row-major enumeration keeps the result ordered; no dedupe needed.
        Ok(NearestResult {
            cells,
            distance: best_sq.sqrt() * geometry.cellsize,
        })
    }

    fn has_data(&mut self, cell: CellId) -> Result<bool> {
        Ok(self.get_cell(cell.row, cell.col)? != self.no_data())
    }
}

fn cell_distance_sq(a: CellId, b: CellId) -> f64 {
    let dr = (a.row - b.row) as f64;
    let dc = (a.col - b.col) as f64;
    dr * dr + dc * dc
}
