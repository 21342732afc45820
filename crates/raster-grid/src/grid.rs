//! Grid coordinate dispatch over the chunk map.
//!
//! The grid owns an ordered map from [`ChunkId`] to [`Chunk`] holding only
//! memory-resident chunks, plus the set of ids that have been evicted to
//! the backing store. Chunks materialize lazily as Uniform(no-data) on the
//! first in-bounds write; out-of-bounds access returns the sentinel
//! without touching the map. Every allocation-heavy step reserves budget
//! headroom first and recovers from a failed reservation by evicting
//! unpinned chunks and retrying once.

use std::collections::{BTreeMap, HashSet};

use bytes::Bytes;
use tracing::{debug, warn};

use chunk_store::ChunkStore;
use raster_common::{CellValue, ChunkId, GridGeometry};

use crate::chunk::{Chunk, ChunkPolicy};
use crate::config::{GridConfig, PromotionTarget};
use crate::error::{GridError, Result};
use crate::iter::CellIterator;
use crate::memory::{MemoryManager, MemoryStats};
use crate::stats::{GridStats, StatsAccumulator, StatsSnapshot};

/// A chunked 2-D grid of cells of type `T`, spillable to a [`ChunkStore`].
pub struct Grid<T: CellValue, S: ChunkStore> {
    id: String,
    geometry: GridGeometry,
    no_data: T,
    config: GridConfig,
    chunks: BTreeMap<ChunkId, Chunk<T>>,
    evicted: HashSet<ChunkId>,
    stats: GridStats<T>,
    memory: MemoryManager,
    store: S,
}

impl<T: CellValue, S: ChunkStore> Grid<T, S> {
    /// Create an empty grid with the default georeferencing (origin at
    /// (0, 0), unit cells) and chunk extents taken from the config.
    pub fn new(
        id: impl Into<String>,
        rows: i64,
        cols: i64,
        no_data: T,
        config: GridConfig,
        store: S,
    ) -> Result<Self> {
        let geometry = GridGeometry::new(rows, cols, config.chunk_rows, config.chunk_cols);
        Self::with_geometry(id, geometry, no_data, config, store)
    }

    /// Create an empty grid with explicit geometry. Chunk extents come
    /// from the geometry, not the config.
    pub fn with_geometry(
        id: impl Into<String>,
        geometry: GridGeometry,
        no_data: T,
        config: GridConfig,
        store: S,
    ) -> Result<Self> {
        config.validate().map_err(GridError::config)?;
        if geometry.rows < 0 || geometry.cols < 0 {
            return Err(GridError::config("grid extents must be >= 0"));
        }
        if geometry.chunk_rows <= 0 || geometry.chunk_cols <= 0 {
            return Err(GridError::config("chunk extents must be > 0"));
        }

        let id = id.into();
        let no_data = if no_data.is_valid_no_data() {
            no_data
        } else {
            // The sole silent substitution: a non-finite sentinel would
            // make sentinel comparison undefined.
            let fallback = T::default_no_data();
            warn!(
                grid = %id,
                requested = %no_data,
                substituted = %fallback,
                "Invalid no-data sentinel; substituting the type default"
            );
            fallback
        };

        let stats = GridStats::new(config.stats_mode, no_data);
        let memory = MemoryManager::new(config.memory_budget_bytes());
        Ok(Self {
            id,
            geometry,
            no_data,
            config,
            chunks: BTreeMap::new(),
            evicted: HashSet::new(),
            stats,
            memory,
            store,
        })
    }

    /// The grid identifier (namespaces chunks in the backing store).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The grid geometry.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// The no-data sentinel.
    pub fn no_data(&self) -> T {
        self.no_data
    }

    /// The configuration the grid was built with.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The backing chunk store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn chunk_policy(&self) -> ChunkPolicy<T> {
        ChunkPolicy {
            promotion: self.config.promotion,
            sparse_occupancy: self.config.sparse_occupancy,
            no_data: self.no_data,
        }
    }

    // ========================================================================
    // Cell access
    // ========================================================================

    /// Read a cell. Out-of-bounds coordinates return the no-data sentinel
    /// without creating or loading anything.
    pub fn get_cell(&mut self, row: i64, col: i64) -> Result<T> {
        if !self.geometry.contains(row, col) {
            return Ok(self.no_data);
        }
        let id = self.geometry.chunk_of(row, col);
        let (local_row, local_col) = self.geometry.local_of(row, col);

        if !self.chunks.contains_key(&id) {
            if !self.evicted.contains(&id) {
                // Never materialized: every cell is no-data.
                return Ok(self.no_data);
            }
            self.reload_chunk(id)?;
        }

        let chunk = self.chunks.get(&id).ok_or(GridError::MissingChunk(id))?;
        let value = chunk.get(local_row, local_col);
        let bytes = chunk.heap_bytes();
        if !chunk.is_uniform() {
            self.memory.touch(id, bytes);
        }
        Ok(value)
    }

    /// Write a cell, returning the prior value. Out-of-bounds coordinates
    /// return the sentinel without mutating or creating anything.
    pub fn set_cell(&mut self, row: i64, col: i64, value: T) -> Result<T> {
        let prior = self.write_cell(row, col, value)?;
        if let Some(prior) = prior {
            // Stats only after the chunk mutation committed.
            self.stats.observe_replace(value, prior);
            Ok(prior)
        } else {
            Ok(self.no_data)
        }
    }

    /// Write a cell without permitting chunk promotion.
    ///
    /// Same dispatch as [`Grid::set_cell`], but a differing write to a
    /// still-Uniform chunk surfaces [`GridError::UnsupportedMutation`]
    /// instead of promoting. No reservation is needed: the representation
    /// cannot grow.
    pub fn try_set_cell(&mut self, row: i64, col: i64, value: T) -> Result<T> {
        if !self.geometry.contains(row, col) {
            return Ok(self.no_data);
        }
        let id = self.geometry.chunk_of(row, col);
        let (local_row, local_col) = self.geometry.local_of(row, col);
        self.ensure_resident(id)?;
        let chunk = self
            .chunks
            .get_mut(&id)
            .ok_or(GridError::MissingChunk(id))?;
        let prior = chunk.try_set(local_row, local_col, value)?;
        let bytes = chunk.heap_bytes();
        if !chunk.is_uniform() {
            self.memory.touch(id, bytes);
        }
        self.stats.observe_replace(value, prior);
        Ok(prior)
    }

    /// Bulk-construction write: same dispatch as [`Grid::set_cell`] but
    /// with no incremental stats update. The aggregates are invalidated
    /// and rebuilt by the next stats read.
    pub fn init_cell(&mut self, row: i64, col: i64, value: T) -> Result<()> {
        if self.write_cell(row, col, value)?.is_some() {
            self.stats.invalidate();
        }
        Ok(())
    }

    /// Add `delta` to a cell, returning the resulting value.
    ///
    /// No-data is non-additive: adding to a no-data cell yields exactly
    /// the delta, and adding a no-data delta is a no-op.
    pub fn add_to_cell(&mut self, row: i64, col: i64, delta: T) -> Result<T> {
        if !self.geometry.contains(row, col) {
            return Ok(self.no_data);
        }
        let prior = self.get_cell(row, col)?;
        if delta == self.no_data {
            return Ok(prior);
        }
        let next = if prior == self.no_data {
            delta
        } else {
            prior.add(delta)
        };
        self.set_cell(row, col, next)?;
        Ok(next)
    }

    /// Shared write path. Returns `None` for out-of-bounds writes (no
    /// mutation happened) and the prior value otherwise.
    fn write_cell(&mut self, row: i64, col: i64, value: T) -> Result<Option<T>> {
        if !self.geometry.contains(row, col) {
            return Ok(None);
        }
        let id = self.geometry.chunk_of(row, col);
        let (local_row, local_col) = self.geometry.local_of(row, col);
        self.ensure_resident(id)?;

        // Promotion is the allocation-heavy step on this path; reserve
        // headroom for the promoted representation before mutating.
        let needs_promotion = match self.chunks.get(&id) {
            Some(Chunk::Uniform(u)) => value != u.value(),
            _ => false,
        };
        if needs_promotion {
            let incoming = self.promoted_bytes_estimate(id);
            self.reserve(incoming)?;
        }

        let policy = self.chunk_policy();
        let chunk = self
            .chunks
            .get_mut(&id)
            .ok_or(GridError::MissingChunk(id))?;
        let prior = chunk.set(local_row, local_col, value, policy);
        let bytes = chunk.heap_bytes();
        if !chunk.is_uniform() {
            self.memory.touch(id, bytes);
        }
        Ok(Some(prior))
    }

    fn promoted_bytes_estimate(&self, id: ChunkId) -> usize {
        let (rows, cols) = self.geometry.chunk_shape(id).unwrap_or((0, 0));
        match self.config.promotion {
            PromotionTarget::Dense => rows as usize * cols as usize * std::mem::size_of::<T>(),
            // A freshly promoted sparse chunk holds a single overlay entry.
            PromotionTarget::Sparse => 64,
        }
    }

    // ========================================================================
    // Chunk residency
    // ========================================================================

    /// Materialize or reload the chunk holding `id`.
    fn ensure_resident(&mut self, id: ChunkId) -> Result<()> {
        if self.chunks.contains_key(&id) {
            return Ok(());
        }
        if self.evicted.contains(&id) {
            return self.reload_chunk(id);
        }
        let (rows, cols) = self
            .geometry
            .chunk_shape(id)
            .ok_or_else(|| GridError::config(format!("{id} outside the chunk lattice")))?;
        self.chunks.insert(id, Chunk::uniform(rows, cols, self.no_data));
        debug!(grid = %self.id, chunk = %id, "Materialized uniform chunk");
        Ok(())
    }

    /// Load an evicted chunk back into the map.
    fn reload_chunk(&mut self, id: ChunkId) -> Result<()> {
        let payload = self
            .store
            .load(&self.id, id)?
            .ok_or(GridError::MissingChunk(id))?;
        let chunk: Chunk<T> = serde_json::from_slice(&payload)?;
        let bytes = chunk.heap_bytes();
        self.reserve(bytes)?;
        self.evicted.remove(&id);
        if !chunk.is_uniform() {
            self.memory.touch(id, bytes);
        }
        self.chunks.insert(id, chunk);
        self.memory.note_reload();
        debug!(grid = %self.id, chunk = %id, bytes, "Reloaded evicted chunk");
        Ok(())
    }

    /// Borrow a resident chunk.
    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk<T>> {
        self.chunks.get(&id)
    }

    /// Borrow a chunk, transparently reloading it if evicted. Returns
    /// `None` for chunks that were never materialized.
    pub fn load_chunk(&mut self, id: ChunkId) -> Result<Option<&Chunk<T>>> {
        if !self.chunks.contains_key(&id) && self.evicted.contains(&id) {
            self.reload_chunk(id)?;
        }
        Ok(self.chunks.get(&id))
    }

    /// Number of memory-resident chunks.
    pub fn resident_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of evicted (persisted, non-resident) chunks.
    pub fn evicted_chunk_count(&self) -> usize {
        self.evicted.len()
    }

    /// Whether a chunk is currently memory-resident.
    pub fn is_resident(&self, id: ChunkId) -> bool {
        self.chunks.contains_key(&id)
    }

    /// Whether a chunk has ever been materialized (resident or evicted).
    pub fn is_materialized(&self, id: ChunkId) -> bool {
        self.chunks.contains_key(&id) || self.evicted.contains(&id)
    }

    /// Ids of every materialized chunk, resident first, in map order.
    fn materialized_ids(&self) -> Vec<ChunkId> {
        self.chunks
            .keys()
            .copied()
            .chain(self.evicted.iter().copied())
            .collect()
    }

    // ========================================================================
    // Memory pressure
    // ========================================================================

    /// Pin a chunk: not evictable until unpinned.
    pub fn pin(&mut self, id: ChunkId) {
        self.memory.pin(id);
    }

    /// Release a pin.
    pub fn unpin(&mut self, id: ChunkId) {
        self.memory.unpin(id);
    }

    /// Proactive pressure check: if the resident estimate exceeds the
    /// budget, evict unpinned chunks until it fits or none remain.
    /// Best-effort; never fails for lack of candidates.
    pub fn check_and_maybe_free_memory(&mut self) -> Result<usize> {
        self.evict_until(0)
    }

    /// Current memory counters.
    pub fn memory_stats(&self) -> MemoryStats {
        self.memory.stats()
    }

    /// Reserve headroom for `incoming` bytes. On failure the reservation
    /// evicts unpinned chunks and retries exactly once; if eviction freed
    /// nothing, the original failure is fatal.
    fn reserve(&mut self, incoming: usize) -> Result<()> {
        if self.memory.has_headroom(incoming) {
            return Ok(());
        }
        let freed = self.evict_until(incoming)?;
        if freed == 0 || !self.memory.has_headroom(incoming) {
            return Err(GridError::resource_exhausted(format!(
                "need {incoming} bytes with {} resident of a {} byte budget and no evictable chunk remains",
                self.memory.resident_bytes(),
                self.memory.budget_bytes()
            )));
        }
        Ok(())
    }

    /// Evict least-recently-touched unpinned chunks until `incoming`
    /// bytes fit. Returns the number of chunks evicted.
    fn evict_until(&mut self, incoming: usize) -> Result<usize> {
        let mut evicted = 0;
        while !self.memory.has_headroom(incoming) {
            let Some(victim) = self.memory.next_victim() else {
                break;
            };
            if !self.evict_chunk(victim)? {
                break;
            }
            evicted += 1;
        }
        Ok(evicted)
    }

    /// Persist a chunk and drop it from the resident map. Returns whether
    /// the chunk was evicted; Uniform, pinned, and non-resident chunks are
    /// left alone.
    pub fn evict_chunk(&mut self, id: ChunkId) -> Result<bool> {
        let Some(chunk) = self.chunks.get(&id) else {
            return Ok(false);
        };
        if chunk.is_uniform() || self.memory.is_pinned(id) {
            return Ok(false);
        }
        // A chunk never leaves the live map without being persisted first.
        let payload = serde_json::to_vec(chunk)?;
        let bytes = payload.len();
        self.store.persist(&self.id, id, Bytes::from(payload))?;
        self.chunks.remove(&id);
        self.evicted.insert(id);
        self.memory.forget(id);
        self.memory.note_eviction();
        debug!(grid = %self.id, chunk = %id, bytes, "Evicted chunk to backing store");
        Ok(true)
    }

    /// Evict every evictable resident chunk. Returns the number evicted.
    pub fn evict_all(&mut self) -> Result<usize> {
        let ids: Vec<ChunkId> = self.chunks.keys().copied().collect();
        let mut evicted = 0;
        for id in ids {
            if self.evict_chunk(id)? {
                evicted += 1;
            }
        }
        Ok(evicted)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Current aggregates over non-no-data cells.
    ///
    /// Runs a full linear scan first when forced, when the grid is in lazy
    /// mode and dirty, or when an eager incremental step lost track of an
    /// extreme.
    pub fn stats(&mut self, force_recompute: bool) -> Result<StatsSnapshot<T>> {
        if force_recompute || self.stats.needs_recompute() {
            self.recompute_stats()?;
        }
        Ok(self.stats.snapshot())
    }

    /// Mark the aggregates stale.
    pub fn invalidate_stats(&mut self) {
        self.stats.invalidate();
    }

    fn recompute_stats(&mut self) -> Result<()> {
        let mut acc = StatsAccumulator::new(self.no_data);
        // Untouched chunks are uniformly no-data and contribute nothing.
        for id in self.materialized_ids() {
            if !self.chunks.contains_key(&id) {
                self.reload_chunk(id)?;
            }
            let chunk = self.chunks.get(&id).ok_or(GridError::MissingChunk(id))?;
            for value in chunk.values() {
                acc.observe(value);
            }
        }
        self.stats.finish(acc);
        debug!(grid = %self.id, "Recomputed grid statistics");
        Ok(())
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Lazy, forward-only iterator over every cell value, ordered
    /// chunk-by-chunk (row-major over the lattice) and row-major within a
    /// chunk. Restart by creating a new iterator.
    pub fn cells(&mut self) -> CellIterator<'_, T, S> {
        CellIterator::new(self)
    }
}
