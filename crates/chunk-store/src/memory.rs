//! In-memory chunk store for tests and short-lived grids.

use std::collections::HashMap;

use bytes::Bytes;
use raster_common::ChunkId;

use crate::error::StoreResult;
use crate::ChunkStore;

/// `HashMap`-backed chunk store.
///
/// Keeps simple counters so tests can assert on persistence traffic.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    entries: HashMap<(String, ChunkId), Bytes>,
    persist_count: u64,
    load_count: u64,
}

impl MemoryChunkStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no payloads.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total `persist` calls observed.
    pub fn persist_count(&self) -> u64 {
        self.persist_count
    }

    /// Total `load` calls observed.
    pub fn load_count(&self) -> u64 {
        self.load_count
    }
}

impl ChunkStore for MemoryChunkStore {
    fn persist(&mut self, grid_id: &str, chunk_id: ChunkId, payload: Bytes) -> StoreResult<()> {
        self.persist_count += 1;
        self.entries.insert((grid_id.to_string(), chunk_id), payload);
        Ok(())
    }

    fn load(&mut self, grid_id: &str, chunk_id: ChunkId) -> StoreResult<Option<Bytes>> {
        self.load_count += 1;
        Ok(self
            .entries
            .get(&(grid_id.to_string(), chunk_id))
            .cloned())
    }

    fn remove(&mut self, grid_id: &str, chunk_id: ChunkId) -> StoreResult<()> {
        self.entries.remove(&(grid_id.to_string(), chunk_id));
        Ok(())
    }

    fn contains(&self, grid_id: &str, chunk_id: ChunkId) -> bool {
        self.entries.contains_key(&(grid_id.to_string(), chunk_id))
    }
}
