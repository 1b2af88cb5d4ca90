use crate::commands::{CmdMessage, CmdResult, PackPaths};
use crate::error::{PackError, Result};
use crate::model::Store;
use crate::store::{blob, KeyValueStore, StoreBackend};
use serde_json::Value;
use std::path::Path;

/// Dumps the key-value store of `pack` into `packs/<pack>.db`.
pub fn run<B: StoreBackend>(backend: &B, paths: &PackPaths, pack: &str) -> Result<CmdResult> {
    let store_dir = paths.store_dir(pack);
    let destination = paths.db_file(pack);

    let count = dump_store(backend, &store_dir, &destination)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Dumped {} entries from {} to {}",
        count,
        store_dir.display(),
        destination.display()
    )));
    Ok(result)
}

/// Writes every entry of the store at `store_dir` to `destination` and
/// returns the entry count.
///
/// Values are parsed as JSON; a value that is not valid JSON is kept as a
/// JSON string.
pub fn dump_store<B: StoreBackend>(backend: &B, store_dir: &Path, destination: &Path) -> Result<usize> {
    if !backend.exists(store_dir) {
        return Err(PackError::StoreNotFound(store_dir.to_path_buf()));
    }

    let kv = backend.open(store_dir)?;
    let mut store = Store::new();
    for (key, raw) in kv.entries()? {
        let value = match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::debug!("Value of {} is not JSON ({}), keeping it as a string", key, err);
                Value::String(raw)
            }
        };
        store.insert(key, value);
    }

    blob::write_pretty(destination, &store)?;
    log::info!(
        "Dumped {} entries from {} to {}",
        store.len(),
        store_dir.display(),
        destination.display()
    );
    Ok(store.len())
}
