//! Common test fixtures for raster-store tests.
//!
//! Pre-configured grids and helpers that represent the scenarios the test
//! suite keeps coming back to: small grids with tiny chunks (so chunk
//! boundaries are actually crossed) and grids with tight memory budgets
//! (so eviction actually happens).

use chunk_store::MemoryChunkStore;
use raster_grid::{Grid, GridConfig, PromotionTarget, StatsMode};

/// The no-data sentinel used throughout the test suite.
pub const NO_DATA: f64 = -9999.0;

/// A [`GridConfig`] with small chunks so tests cross chunk boundaries.
pub fn small_chunk_config() -> GridConfig {
    GridConfig {
        chunk_rows: 4,
        chunk_cols: 4,
        ..GridConfig::default()
    }
}

/// A 10x10 grid of f64 cells with 4x4 chunks and the in-memory store.
pub fn small_grid() -> Grid<f64, MemoryChunkStore> {
    Grid::new(
        "test-grid",
        10,
        10,
        NO_DATA,
        small_chunk_config(),
        MemoryChunkStore::new(),
    )
    .expect("valid test grid config")
}

/// Like [`small_grid`] but with lazy statistics.
pub fn small_lazy_grid() -> Grid<f64, MemoryChunkStore> {
    let config = GridConfig {
        stats_mode: StatsMode::Lazy,
        ..small_chunk_config()
    };
    Grid::new("test-grid-lazy", 10, 10, NO_DATA, config, MemoryChunkStore::new())
        .expect("valid test grid config")
}

/// Like [`small_grid`] but promoting Uniform chunks to the sparse-hybrid
/// representation.
pub fn small_sparse_grid() -> Grid<f64, MemoryChunkStore> {
    let config = GridConfig {
        promotion: PromotionTarget::Sparse,
        ..small_chunk_config()
    };
    Grid::new("test-grid-sparse", 10, 10, NO_DATA, config, MemoryChunkStore::new())
        .expect("valid test grid config")
}

/// A grid whose 1 MB budget fits exactly two dense 256x256 f64 chunks
/// (512 KB each), for exercising eviction under pressure.
pub fn tight_budget_grid() -> Grid<f64, MemoryChunkStore> {
    let config = GridConfig {
        chunk_rows: 256,
        chunk_cols: 256,
        memory_budget_mb: 1,
        ..GridConfig::default()
    };
    Grid::new("test-grid-tight", 1024, 1024, NO_DATA, config, MemoryChunkStore::new())
        .expect("valid test grid config")
}
