//! # Storage Layer
//!
//! A pack lives in two places on disk:
//!
//! ```text
//! packs/
//! ├── actors/              # the key-value store the host reads
//! │   └── entries.sqlite3
//! └── actors.db            # flat JSON blob: { "<key>": <document>, ... }
//! ```
//!
//! `dump` and `restore` move entries between the key-value store and the blob;
//! `extract` and `compile` only ever touch the blob (see [`blob`]).
//!
//! The key-value store is abstracted behind [`KeyValueStore`] and
//! [`StoreBackend`] so the maintenance commands can be tested without touching
//! the filesystem:
//!
//! - [`sqlite::SqliteBackend`]: production, one SQLite file per pack directory
//! - [`memory::MemoryBackend`]: in-memory, for tests

use crate::error::Result;
use std::path::Path;

pub mod blob;
pub mod memory;
pub mod sqlite;

/// Ordered string key-value storage for one pack.
pub trait KeyValueStore {
    /// All entries in ascending key order.
    fn entries(&self) -> Result<Vec<(String, String)>>;

    /// Insert or replace one entry.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Insert or replace many entries, in order.
    fn put_all(&mut self, entries: &[(String, String)]) -> Result<()> {
        for (key, value) in entries {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// The first `limit` keys in ascending order.
    fn sample_keys(&self, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .entries()?
            .into_iter()
            .take(limit)
            .map(|(key, _)| key)
            .collect())
    }
}

/// Opens and destroys the key-value store of a pack directory.
pub trait StoreBackend {
    type Store: KeyValueStore;

    /// Open the store at `pack_dir`, creating it if needed.
    fn open(&self, pack_dir: &Path) -> Result<Self::Store>;

    /// Whether a store has been created at `pack_dir`.
    fn exists(&self, pack_dir: &Path) -> bool;

    /// Remove every entry stored at `pack_dir`. Absence is not an error.
    fn destroy(&self, pack_dir: &Path) -> Result<()>;
}
