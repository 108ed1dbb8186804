//! # Shard Handle Pool
//!
//! Opening a shard costs a file open, an mmap, and header validation; a
//! busy process touches the same shards over and over. The pool keeps one
//! read-only handle per physical shard path for the life of the process.
//!
//! ## Locking
//!
//! A `parking_lot::RwLock` guards the path map. The hot path takes the read
//! lock and clones out an `Arc`; a miss upgrades to the write lock,
//! re-checks (another thread may have won the race), opens, and inserts.
//! Handles are never evicted, trading one open map per distinct shard for
//! lookup latency. Lookups on an obtained handle take no lock at all; the
//! underlying store is immutable and safe for concurrent readers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::tch::TchReader;

#[derive(Debug, Default)]
pub struct ShardPool {
    handles: RwLock<HashMap<PathBuf, Arc<TchReader>>>,
}

impl ShardPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pooled handle for a shard, opening it on first access.
    ///
    /// A path that does not exist on disk is a configuration error
    /// ([`Error::ShardMissing`]): the profile promised a shard the
    /// filesystem does not have.
    pub fn get(&self, path: &Path) -> Result<Arc<TchReader>> {
        if let Some(handle) = self.handles.read().get(path) {
            return Ok(Arc::clone(handle));
        }

        let mut handles = self.handles.write();
        if let Some(handle) = handles.get(path) {
            return Ok(Arc::clone(handle));
        }

        if !path.is_file() {
            return Err(Error::ShardMissing {
                path: path.to_owned(),
            });
        }

        debug!(path = %path.display(), "opening shard");
        let handle = Arc::new(TchReader::open(path)?);
        handles.insert(path.to_owned(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Number of shards opened so far.
    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }
}
