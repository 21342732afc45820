//! Backing chunk store for spilled grid chunks.
//!
//! The grid engine persists chunks through the [`ChunkStore`] trait and
//! treats the payload as opaque bytes. Two implementations are provided:
//!
//! - [`MemoryChunkStore`] - a `HashMap`-backed store for tests and
//!   short-lived grids
//! - [`FsChunkStore`] - one file per chunk under a spill directory

pub mod error;
pub mod fs;
pub mod memory;

// Re-export commonly used types at the crate root
pub use error::{StoreError, StoreResult};
pub use fs::FsChunkStore;
pub use memory::MemoryChunkStore;

use bytes::Bytes;
use raster_common::ChunkId;

/// Persistence backend for evicted chunks.
///
/// Payloads are opaque to the store; serialization format is owned by the
/// grid layer. `persist` replaces any previous payload for the same chunk.
pub trait ChunkStore {
    /// Persist a chunk payload, replacing any previous version.
    fn persist(&mut self, grid_id: &str, chunk_id: ChunkId, payload: Bytes) -> StoreResult<()>;

    /// Load a previously persisted payload, or `None` if absent.
    fn load(&mut self, grid_id: &str, chunk_id: ChunkId) -> StoreResult<Option<Bytes>>;

    /// Drop a persisted payload if present.
    fn remove(&mut self, grid_id: &str, chunk_id: ChunkId) -> StoreResult<()>;

    /// Whether a payload exists for the chunk.
    fn contains(&self, grid_id: &str, chunk_id: ChunkId) -> bool;
}
