//! Filesystem spill store: one file per chunk under a root directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use raster_common::ChunkId;

use crate::error::{StoreError, StoreResult};
use crate::ChunkStore;

/// Chunk store backed by a local spill directory.
///
/// Layout: `<root>/<grid_id>/chunk_<row>_<col>.bin`. Writes go through a
/// temporary file and a rename so a crash mid-write never leaves a torn
/// payload behind.
#[derive(Debug)]
pub struct FsChunkStore {
    root: PathBuf,
}

impl FsChunkStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(StoreError::InvalidRoot("empty path".to_string()));
        }
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The spill directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn chunk_path(&self, grid_id: &str, chunk_id: ChunkId) -> PathBuf {
        self.root
            .join(grid_id)
            .join(format!("chunk_{}_{}.bin", chunk_id.row, chunk_id.col))
    }
}

impl ChunkStore for FsChunkStore {
    fn persist(&mut self, grid_id: &str, chunk_id: ChunkId, payload: Bytes) -> StoreResult<()> {
        let path = self.chunk_path(grid_id, chunk_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &payload)?;
        fs::rename(&tmp, &path)?;
        debug!(
            grid = grid_id,
            chunk = %chunk_id,
            bytes = payload.len(),
            "Persisted chunk to spill store"
        );
        Ok(())
    }

    fn load(&mut self, grid_id: &str, chunk_id: ChunkId) -> StoreResult<Option<Bytes>> {
        let path = self.chunk_path(grid_id, chunk_id);
        match fs::read(&path) {
            Ok(data) => {
                debug!(
                    grid = grid_id,
                    chunk = %chunk_id,
                    bytes = data.len(),
                    "Loaded chunk from spill store"
                );
                Ok(Some(Bytes::from(data)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&mut self, grid_id: &str, chunk_id: ChunkId) -> StoreResult<()> {
        let path = self.chunk_path(grid_id, chunk_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, grid_id: &str, chunk_id: ChunkId) -> bool {
        self.chunk_path(grid_id, chunk_id).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsChunkStore::open(dir.path()).unwrap();
        let id = ChunkId::new(3, 4);
        let payload = Bytes::from_static(b"spilled");

        assert!(store.load("dem", id).unwrap().is_none());
        store.persist("dem", id, payload.clone()).unwrap();
        assert!(store.contains("dem", id));
        assert_eq!(store.load("dem", id).unwrap(), Some(payload));

        store.remove("dem", id).unwrap();
        assert!(!store.contains("dem", id));
        assert!(store.load("dem", id).unwrap().is_none());
    }

    #[test]
    fn test_persist_replaces_previous_payload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsChunkStore::open(dir.path()).unwrap();
        let id = ChunkId::new(0, 0);
        store.persist("g", id, Bytes::from_static(b"one")).unwrap();
        store.persist("g", id, Bytes::from_static(b"two")).unwrap();
        assert_eq!(
            store.load("g", id).unwrap(),
            Some(Bytes::from_static(b"two"))
        );
    }

    #[test]
    fn test_open_rejects_empty_root() {
        assert!(FsChunkStore::open("").is_err());
    }
}
