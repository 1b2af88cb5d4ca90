use crate::commands::{CmdMessage, CmdResult, PackPaths};
use crate::error::{PackError, Result};
use crate::store::{blob, KeyValueStore, StoreBackend};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct RestoreReport {
    pub entries: usize,
    pub backup: Option<PathBuf>,
}

/// Rebuilds the key-value store of `pack` from `packs/<pack>.db`.
pub fn run<B: StoreBackend>(
    backend: &B,
    paths: &PackPaths,
    pack: &str,
    backup: bool,
) -> Result<CmdResult> {
    let source = paths.db_file(pack);
    let store_dir = paths.store_dir(pack);

    let report = restore_store(backend, &source, &store_dir, backup)?;

    let mut result = CmdResult::default();
    if let Some(path) = &report.backup {
        result.add_message(CmdMessage::info(format!(
            "Backed up existing store to {}",
            path.display()
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Restored {} entries from {} to {}",
        report.entries,
        source.display(),
        store_dir.display()
    )));
    Ok(result)
}

/// Replaces the store at `store_dir` with the entries of the blob at `source`.
///
/// The blob is read before anything is removed, so a missing or unreadable
/// blob leaves the existing store untouched.
pub fn restore_store<B: StoreBackend>(
    backend: &B,
    source: &Path,
    store_dir: &Path,
    backup: bool,
) -> Result<RestoreReport> {
    let blob = blob::read_entries(source)?;
    let entries: Vec<(String, String)> = blob
        .into_iter()
        .map(|(key, value)| {
            let raw = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (key, raw)
        })
        .collect();

    let mut report = RestoreReport::default();
    if backup {
        report.backup = backup_dir(store_dir)?;
    }

    backend.destroy(store_dir)?;
    let mut kv = backend.open(store_dir)?;
    kv.put_all(&entries)?;

    report.entries = entries.len();
    log::info!(
        "Restored {} entries from {} to {}",
        report.entries,
        source.display(),
        store_dir.display()
    );
    Ok(report)
}

/// Renames `dir` to `<dir>.bak-<unix millis>`. Returns `None` when there is
/// nothing on disk to back up.
fn backup_dir(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.exists() {
        log::info!("No existing store at {}, skipping backup", dir.display());
        return Ok(None);
    }

    let mut name = dir.as_os_str().to_os_string();
    name.push(format!(".bak-{}", chrono::Utc::now().timestamp_millis()));
    let target = PathBuf::from(name);

    fs::rename(dir, &target).map_err(PackError::Io)?;
    log::info!("Backed up {} to {}", dir.display(), target.display());
    Ok(Some(target))
}
