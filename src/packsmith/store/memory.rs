use super::{KeyValueStore, StoreBackend};
use crate::error::Result;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

type Entries = BTreeMap<String, String>;

/// In-memory backend for testing.
///
/// Stores handed out by [`MemoryBackend::open`] share state with the backend,
/// so a test can restore through one handle and inspect through another.
/// `RefCell` is enough since packsmith is single-threaded.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    packs: Rc<RefCell<BTreeMap<PathBuf, Entries>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: seed a pack directory with entries.
    pub fn seed<K: Into<String>, V: Into<String>>(
        &self,
        pack_dir: &Path,
        entries: impl IntoIterator<Item = (K, V)>,
    ) {
        let mut packs = self.packs.borrow_mut();
        let pack = packs.entry(pack_dir.to_path_buf()).or_default();
        for (key, value) in entries {
            pack.insert(key.into(), value.into());
        }
    }

    pub fn contains(&self, pack_dir: &Path) -> bool {
        self.packs.borrow().contains_key(pack_dir)
    }
}

pub struct MemoryStore {
    pack_dir: PathBuf,
    packs: Rc<RefCell<BTreeMap<PathBuf, Entries>>>,
}

impl KeyValueStore for MemoryStore {
    fn entries(&self) -> Result<Vec<(String, String)>> {
        let packs = self.packs.borrow();
        Ok(packs
            .get(&self.pack_dir)
            .map(|pack| {
                pack.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.packs
            .borrow_mut()
            .entry(self.pack_dir.clone())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl StoreBackend for MemoryBackend {
    type Store = MemoryStore;

    fn open(&self, pack_dir: &Path) -> Result<MemoryStore> {
        self.packs
            .borrow_mut()
            .entry(pack_dir.to_path_buf())
            .or_default();
        Ok(MemoryStore {
            pack_dir: pack_dir.to_path_buf(),
            packs: Rc::clone(&self.packs),
        })
    }

    fn exists(&self, pack_dir: &Path) -> bool {
        self.contains(pack_dir)
    }

    fn destroy(&self, pack_dir: &Path) -> Result<()> {
        self.packs.borrow_mut().remove(pack_dir);
        Ok(())
    }
}
