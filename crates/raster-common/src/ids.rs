//! Cell and chunk coordinate identifiers.

use serde::{Deserialize, Serialize};

/// Global cell coordinates within a grid.
///
/// Row 0 is the top (northernmost) row. Coordinates are signed so that
/// out-of-bounds probes and floor-division chunk addressing stay
/// deterministic for negative indices.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellId {
    pub row: i64,
    pub col: i64,
}

impl CellId {
    /// Create a new cell identifier.
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Position of a chunk in the chunk lattice.
///
/// Immutable; serves as the key of the grid's ordered chunk map. The derived
/// `Ord` is row-major (row first, then column), which gives the map its
/// chunk-by-chunk iteration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChunkId {
    pub row: i64,
    pub col: i64,
}

impl ChunkId {
    /// Create a new chunk identifier.
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chunk({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_row_major_order() {
        let mut ids = vec![
            ChunkId::new(1, 0),
            ChunkId::new(0, 2),
            ChunkId::new(0, 0),
            ChunkId::new(1, 1),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                ChunkId::new(0, 0),
                ChunkId::new(0, 2),
                ChunkId::new(1, 0),
                ChunkId::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CellId::new(3, -1).to_string(), "(3, -1)");
        assert_eq!(ChunkId::new(0, 7).to_string(), "chunk(0, 7)");
    }
}
