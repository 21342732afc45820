//! Memory accounting, pinning, and eviction candidate tracking.
//!
//! The manager does not touch chunks itself; it owns the byte ledger, the
//! pin-set, and the recency order, and answers two questions for the grid:
//! "is there headroom for this allocation?" and "which chunk goes next?".
//! Uniform chunks are never registered: they own no heap and are kept
//! resident unconditionally.

use std::collections::HashSet;

use lru::LruCache;

use raster_common::ChunkId;

/// Runtime counters for memory management.
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    /// Estimated heap bytes of resident non-uniform chunks.
    pub resident_bytes: usize,
    /// Non-uniform chunks currently tracked.
    pub tracked_chunks: usize,
    /// Chunks currently pinned.
    pub pinned_chunks: usize,
    /// Total evictions performed.
    pub evictions: u64,
    /// Total reloads of evicted chunks.
    pub reloads: u64,
}

/// Tracks the memory budget, the pin-set, and eviction candidates.
#[derive(Debug)]
pub struct MemoryManager {
    budget_bytes: usize,
    resident_bytes: usize,
    pinned: HashSet<ChunkId>,
    /// Recency order over tracked chunks; value is the chunk's byte estimate.
    recency: LruCache<ChunkId, usize>,
    evictions: u64,
    reloads: u64,
}

impl MemoryManager {
    /// Create a manager with the given byte budget.
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            budget_bytes,
            resident_bytes: 0,
            pinned: HashSet::new(),
            recency: LruCache::unbounded(),
            evictions: 0,
            reloads: 0,
        }
    }

    /// The configured budget in bytes.
    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    /// Estimated resident bytes of tracked chunks.
    pub fn resident_bytes(&self) -> usize {
        self.resident_bytes
    }

    /// Whether `incoming` additional bytes fit within the budget.
    pub fn has_headroom(&self, incoming: usize) -> bool {
        self.resident_bytes + incoming <= self.budget_bytes
    }

    /// Record an access to a tracked chunk, updating its byte estimate and
    /// moving it to the most-recently-used position.
    pub fn touch(&mut self, id: ChunkId, bytes: usize) {
        let prior = self.recency.put(id, bytes).unwrap_or(0);
        self.resident_bytes = self.resident_bytes - prior + bytes;
    }

    /// Stop tracking a chunk (evicted or re-collapsed), releasing its bytes.
    pub fn forget(&mut self, id: ChunkId) {
        if let Some(bytes) = self.recency.pop(&id) {
            self.resident_bytes -= bytes;
        }
    }

    /// Mark a chunk not-evictable for the duration of an operation.
    pub fn pin(&mut self, id: ChunkId) {
        self.pinned.insert(id);
    }

    /// Release a pin.
    pub fn unpin(&mut self, id: ChunkId) {
        self.pinned.remove(&id);
    }

    /// Whether a chunk is currently pinned.
    pub fn is_pinned(&self, id: ChunkId) -> bool {
        self.pinned.contains(&id)
    }

    /// Least-recently-touched unpinned tracked chunk, if any.
    pub fn next_victim(&self) -> Option<ChunkId> {
        // LRU end first.
        self.recency
            .iter()
            .rev()
            .map(|(id, _)| *id)
            .find(|id| !self.pinned.contains(id))
    }

    /// Record a completed eviction.
    pub fn note_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Record a completed reload.
    pub fn note_reload(&mut self) {
        self.reloads += 1;
    }

    /// Current counters.
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            resident_bytes: self.resident_bytes,
            tracked_chunks: self.recency.len(),
            pinned_chunks: self.pinned.len(),
            evictions: self.evictions,
            reloads: self.reloads,
        }
    }
}
