//! File tree → store.
//!
//! Every `.json` file under the pack's source tree (except `_folders.json`)
//! holds one top-level document plus its `embedded` children. Files are read
//! in relative-path order so the compiled blob is reproducible.

use crate::commands::{CmdMessage, CmdResult, PackPaths};
use crate::config::PackConfig;
use crate::error::{PackError, Result};
use crate::migrate::migrate;
use crate::model::{StatsStamp, Store, FOLDERS_FILE};
use crate::organize::reconstruct;
use crate::store::blob;
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct CompileReport {
    pub folders: usize,
    pub files_read: usize,
    /// Entries in the compiled store, folders included.
    pub documents: usize,
    /// Files that could not be turned into entries, with the reason.
    pub failed_files: Vec<(PathBuf, String)>,
    /// Embedded documents dropped for lack of an `_originalKey`.
    pub missing_keys: usize,
    /// Keys produced by more than one file; the later file won.
    pub duplicate_keys: Vec<String>,
    pub folders_error: Option<String>,
}

/// Compiles the source tree of `pack` into `packs/<pack>.db`.
pub fn run(paths: &PackPaths, config: &PackConfig, pack: &str) -> Result<CmdResult> {
    let source = paths.source_tree(pack);
    let destination = paths.db_file(pack);

    log::info!("Compiling {} into {}", source.display(), destination.display());
    let report = compile_tree(&source, &destination, &config.stamp())?;

    let mut result = CmdResult::default();
    match &report.folders_error {
        Some(err) => result.add_message(CmdMessage::warning(format!(
            "Could not read {}: {}",
            FOLDERS_FILE, err
        ))),
        None if report.folders > 0 => result.add_message(CmdMessage::info(format!(
            "Added {} folder documents to the compiled database.",
            report.folders
        ))),
        None => {}
    }
    for (file, reason) in &report.failed_files {
        result.add_message(CmdMessage::error(format!(
            "Error processing file {}: {}",
            file.display(),
            reason
        )));
    }
    if report.missing_keys > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Dropped {} embedded document(s) without _originalKey",
            report.missing_keys
        )));
    }
    for key in &report.duplicate_keys {
        result.add_message(CmdMessage::warning(format!(
            "Duplicate key {}, keeping the last file read",
            key
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Compiled {} documents from {} files into {}",
        report.documents,
        report.files_read,
        destination.display()
    )));
    Ok(result)
}

/// Reads the tree at `source` and writes the flat store blob to `destination`.
///
/// A file that cannot be read or has no `_originalKey` is logged, reported
/// and skipped; the blob is still written from the rest.
pub fn compile_tree(source: &Path, destination: &Path, stamp: &StatsStamp) -> Result<CompileReport> {
    if !source.is_dir() {
        return Err(PackError::SourceNotFound(source.to_path_buf()));
    }

    let mut report = CompileReport::default();
    let mut store = load_folders(source, &mut report);

    for relative in collect_files(source, &mut report) {
        report.files_read += 1;
        let display = relative.to_string_lossy().replace('\\', "/");

        let document = match blob::read_json(&source.join(&relative)) {
            Ok(Value::Object(document)) => document,
            Ok(_) => {
                log::error!("Error processing file {}: not a JSON object", display);
                report
                    .failed_files
                    .push((relative, "not a JSON object".to_string()));
                continue;
            }
            Err(err) => {
                log::error!("Error processing file {}: {}", display, err);
                report.failed_files.push((relative, err.to_string()));
                continue;
            }
        };

        let rebuilt = match reconstruct(&display, document) {
            Ok(rebuilt) => rebuilt,
            Err(err) => {
                log::warn!("Skipping {}: {}", display, err);
                report.failed_files.push((relative, err.to_string()));
                continue;
            }
        };
        report.missing_keys += rebuilt.missing_keys;

        for (key, document) in rebuilt.entries {
            let document = migrate(&key, document, stamp);
            if store.insert(key.clone(), Value::Object(document)).is_some() {
                log::warn!("Duplicate key {} in {}, keeping the later file", key, display);
                report.duplicate_keys.push(key);
            }
        }
    }

    report.documents = store.len();
    blob::write_pretty(destination, &store)?;
    log::info!(
        "Compiled {} documents into {}",
        report.documents,
        destination.display()
    );
    Ok(report)
}

/// Seeds the store with the folder documents of `_folders.json`, if present.
fn load_folders(source: &Path, report: &mut CompileReport) -> Store {
    let path = source.join(FOLDERS_FILE);
    if !path.is_file() {
        return Store::new();
    }

    match blob::read_json(&path) {
        Ok(Value::Object(folders)) => {
            report.folders = folders.len();
            log::info!("Added {} folder documents", folders.len());
            folders
        }
        Ok(_) => {
            log::error!("{} is not a JSON object, ignoring it", path.display());
            report.folders_error = Some("not a JSON object".to_string());
            Store::new()
        }
        Err(err) => {
            log::error!("Error reading {}: {}", path.display(), err);
            report.folders_error = Some(err.to_string());
            Store::new()
        }
    }
}

/// Every `.json` document file below `source`, relative and sorted.
///
/// Symlinks are followed. An entry the walk cannot read is recorded in
/// `failed_files` and the walk carries on.
fn collect_files(source: &Path, report: &mut CompileReport) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let relative = err
                    .path()
                    .and_then(|p| p.strip_prefix(source).ok())
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                log::warn!("Skipping unreadable entry {}: {}", relative.display(), err);
                report.failed_files.push((relative, err.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(source) else {
            continue;
        };
        if relative == Path::new(FOLDERS_FILE) {
            continue;
        }
        files.push(relative.to_path_buf());
    }
    files.sort();
    files
}
