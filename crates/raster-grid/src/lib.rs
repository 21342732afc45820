//! Chunked, disk-spillable raster grid engine.
//!
//! Stores large 2-D numeric arrays as a lattice of independently
//! (de)serializable chunks under a bounded memory budget:
//!
//! - **Adaptive representation**: every chunk starts as a single scalar
//!   (Uniform) and is promoted on the first differing write to a dense
//!   array or a sparse-hybrid overlay, chosen by policy
//! - **Bounded memory**: a per-grid budget with pinning; unpinned chunks
//!   are persisted to a backing [`chunk_store::ChunkStore`] and reloaded
//!   transparently on the next access
//! - **Incremental statistics**: count/sum/min/max over non-no-data
//!   cells, kept exact under mutation or recomputed on demand
//! - **Spatial search**: all equally-nearest data cells to a query point
//!
//! # Example
//!
//! ```
//! use chunk_store::MemoryChunkStore;
//! use raster_grid::{Grid, GridConfig};
//!
//! let mut config = GridConfig::default();
//! config.chunk_rows = 64;
//! config.chunk_cols = 64;
//! let mut grid =
//!     Grid::new("dem", 1000, 1000, -9999.0f64, config, MemoryChunkStore::new()).unwrap();
//!
//! grid.set_cell(10, 20, 42.5).unwrap();
//! assert_eq!(grid.get_cell(10, 20).unwrap(), 42.5);
//! assert_eq!(grid.get_cell(-1, -1).unwrap(), -9999.0);
//!
//! let stats = grid.stats(false).unwrap();
//! assert_eq!(stats.n, 1);
//! ```

pub mod chunk;
pub mod config;
pub mod error;
pub mod grid;
pub mod iter;
pub mod memory;
pub mod search;
pub mod stats;

// Re-export commonly used types at the crate root
pub use chunk::{Chunk, ChunkPolicy, DenseChunk, SparseChunk, UniformChunk};
pub use config::{GridConfig, PromotionTarget, StatsMode, DEFAULT_SPARSE_OCCUPANCY};
pub use error::{GridError, Result};
pub use grid::Grid;
pub use iter::CellIterator;
pub use memory::{MemoryManager, MemoryStats};
pub use search::NearestResult;
pub use stats::{GridStats, StatsSnapshot};
