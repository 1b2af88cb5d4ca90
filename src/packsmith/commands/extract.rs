//! Store → file tree.
//!
//! ```text
//! packsrc/<pack>/
//! ├── _folders.json              # every !folders! document, keyed as in the store
//! ├── Loose_Document.json
//! └── Monsters/
//!     └── Ogre_s_Lair/
//!         └── Grug.json          # { "_originalKey": ..., ..., "embedded": [...] }
//! ```

use crate::commands::{CmdMessage, CmdResult, PackPaths};
use crate::config::PackConfig;
use crate::error::{PackError, Result};
use crate::folders::{resolve_path, sanitize, sanitize_value, BrokenChain};
use crate::key::{self, is_folder_key};
use crate::migrate::migrate;
use crate::model::{Document, StatsStamp, Store, FOLDERS_FILE};
use crate::organize::{attach, organize, SkippedEntry};
use crate::store::blob;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const MAX_NAME_ATTEMPTS: usize = 1000;

#[derive(Debug, Default)]
pub struct ExtractReport {
    pub folders: usize,
    /// Files written, relative to the tree root.
    pub files: Vec<PathBuf>,
    /// Entries left out of the tree: unparsable keys, non-object values,
    /// and documents whose file could not be written.
    pub skipped: Vec<SkippedEntry>,
    /// Keys of embedded documents whose parent is not in the store.
    pub orphaned: Vec<String>,
    pub broken_chains: Vec<(String, BrokenChain)>,
    /// Documents written under a disambiguated name, with the name used.
    pub renamed: Vec<(String, PathBuf)>,
}

impl ExtractReport {
    pub fn files_written(&self) -> usize {
        self.files.len()
    }
}

/// Extracts `pack` from its `.db` blob (or `file`) into its source tree.
pub fn run(
    paths: &PackPaths,
    config: &PackConfig,
    pack: &str,
    file: Option<&Path>,
) -> Result<CmdResult> {
    let db_file = file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.db_file(pack));
    let destination = paths.source_tree(pack);

    log::info!("Extracting {} into {}", db_file.display(), destination.display());
    let store = blob::read_store(&db_file)?;
    let report = extract_store(&store, &destination, &config.stamp())?;

    let mut result = CmdResult::default();
    if report.folders > 0 {
        result.add_message(CmdMessage::info(format!(
            "Extracted {} folder documents to: {}",
            report.folders,
            destination.join(FOLDERS_FILE).display()
        )));
    } else {
        result.add_message(CmdMessage::info("No folder documents found to extract."));
    }
    for (key, chain) in &report.broken_chains {
        result.add_message(CmdMessage::warning(format!("{}: {}", key, chain)));
    }
    for (key, path) in &report.renamed {
        result.add_message(CmdMessage::warning(format!(
            "{}: name already taken, written as {}",
            key,
            path.display()
        )));
    }
    if !report.orphaned.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "Dropped {} embedded document(s) without a parent",
            report.orphaned.len()
        )));
    }
    for skipped in &report.skipped {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {}: {}",
            skipped.key, skipped.reason
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Extracted {} documents to individual JSON files.",
        report.files_written()
    )));
    result.add_message(CmdMessage::success(format!(
        "Extraction completed for: {}",
        db_file.display()
    )));
    Ok(result)
}

/// Writes `store` as a file tree rooted at `destination`, replacing any
/// existing tree.
///
/// Only failures that affect the whole tree are returned as errors; a document
/// that cannot be written is logged, reported and skipped.
pub fn extract_store(
    store: &Store,
    destination: &Path,
    stamp: &StatsStamp,
) -> Result<ExtractReport> {
    let mut report = ExtractReport::default();

    remove_tree(destination)?;
    fs::create_dir_all(destination).map_err(PackError::Io)?;

    let folders: Map<String, Value> = store
        .iter()
        .filter(|(k, _)| is_folder_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    report.folders = folders.len();
    if folders.is_empty() {
        log::info!("No folder documents found to extract.");
    } else {
        let folders_path = destination.join(FOLDERS_FILE);
        blob::write_pretty(&folders_path, &folders)?;
        log::info!(
            "Extracted {} folder documents to: {}",
            folders.len(),
            folders_path.display()
        );
    }

    let mut organized = organize(store);
    report.skipped.append(&mut organized.skipped);

    let top_level = organized
        .top_level
        .into_iter()
        .map(|(k, doc)| {
            let doc = migrate(&k, doc, stamp);
            (k, doc)
        })
        .collect();
    let mut embedded = organized.embedded_by_parent;
    for children in embedded.values_mut() {
        for child in children.iter_mut() {
            let document = std::mem::take(&mut child.document);
            child.document = migrate(&child.key, document, stamp);
        }
    }

    let attached = attach(top_level, embedded);
    report.orphaned = attached.orphans.into_iter().map(|o| o.key).collect();

    let mut taken = HashSet::new();
    for (store_key, document) in attached.documents {
        let resolved = resolve_path(&document, &folders);
        if let Some(chain) = resolved.broken {
            report.broken_chains.push((store_key.clone(), chain));
        }

        let base = sanitize_value(document.get("name"));
        let (relative, renamed) =
            claim_file_name(&mut taken, &resolved.segments, &base, &store_key);
        if renamed {
            log::warn!(
                "{} collides with an existing file, writing {}",
                store_key,
                relative.display()
            );
            report.renamed.push((store_key.clone(), relative.clone()));
        }

        match write_document(destination, &relative, &document) {
            Ok(()) => {
                log::debug!("Wrote {}", relative.display());
                report.files.push(relative);
            }
            Err(err) => {
                log::error!("Error extracting document {}: {}", store_key, err);
                report.skipped.push(SkippedEntry {
                    key: store_key,
                    reason: err.to_string(),
                });
            }
        }
    }

    log::info!(
        "Extracted {} documents to individual JSON files.",
        report.files_written()
    );
    Ok(report)
}

fn write_document(root: &Path, relative: &Path, document: &Document) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(PackError::Io)?;
    }
    blob::write_pretty(&path, document)
}

/// Picks `<dir>/<base>.json`, or a name suffixed with the document id when an
/// earlier document already took it. Names are compared on the joined folder
/// segments, ignoring case, so the tree checks out the same on
/// case-insensitive filesystems.
///
/// Returns the relative path and whether it differs from the plain name.
fn claim_file_name(
    taken: &mut HashSet<String>,
    segments: &[String],
    base: &str,
    store_key: &str,
) -> (PathBuf, bool) {
    let dir: PathBuf = segments.iter().collect();
    let prefix: String = segments.iter().map(|s| format!("{}/", s)).collect();
    let id = key::parse(store_key)
        .map(|parsed| sanitize(&parsed.id_segment))
        .unwrap_or_else(|_| sanitize(store_key));

    let fallbacks = std::iter::once(format!("{}_{}", base, id))
        .chain((2..MAX_NAME_ATTEMPTS).map(|n| format!("{}_{}_{}", base, id, n)));
    for (attempt, stem) in std::iter::once(base.to_string()).chain(fallbacks).enumerate() {
        let file_name = format!("{}.json", stem);
        if taken.insert(format!("{}{}", prefix, file_name).to_lowercase()) {
            return (dir.join(file_name), attempt > 0);
        }
    }
    (dir.join(format!("{}_{}.json", base, uuid::Uuid::new_v4())), true)
}

fn remove_tree(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            log::info!("Successfully deleted pack folder: {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!("Pack folder does not exist: {}", path.display());
            Ok(())
        }
        Err(err) => Err(PackError::Io(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn stamp() -> StatsStamp {
        StatsStamp::new("12.343", "fantastic-depths")
    }

    fn store(value: Value) -> Store {
        value.as_object().cloned().unwrap()
    }

    fn read(path: &Path) -> Value {
        blob::read_json(path).unwrap()
    }

    #[test]
    fn test_extract_writes_folders_and_nested_files() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("actors");
        let store = store(json!({
            "!folders!root": {"name": "Monsters", "folder": null},
            "!folders!sub": {"name": "Ogre's Lair", "folder": "root"},
            "!actors!A1": {"name": "Grug", "folder": "sub"},
            "!actors!A2": {"name": "Loose"},
        }));

        let report = extract_store(&store, &dest, &stamp()).unwrap();
        assert_eq!(report.folders, 2);
        assert_eq!(report.files_written(), 2);

        let folders = read(&dest.join("_folders.json"));
        assert_eq!(folders["!folders!sub"]["name"], "Ogre's Lair");
        assert!(folders["!folders!sub"].get("_stats").is_none());

        let grug = read(&dest.join("Monsters").join("Ogre_s_Lair").join("Grug.json"));
        assert_eq!(grug["_originalKey"], "!actors!A1");
        assert_eq!(grug["_stats"]["systemId"], "fantastic-depths");
        assert!(dest.join("Loose.json").exists());
    }

    #[test]
    fn test_extract_embeds_children() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("actors");
        let store = store(json!({
            "!actors!A1": {"name": "Bob"},
            "!actors.items!A1.E1": {"name": "Sword"},
        }));

        let report = extract_store(&store, &dest, &stamp()).unwrap();
        assert_eq!(report.files, vec![PathBuf::from("Bob.json")]);

        let bob = read(&dest.join("Bob.json"));
        let embedded = bob["embedded"].as_array().unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0]["_originalKey"], "!actors.items!A1.E1");
        assert_eq!(embedded[0]["_stats"]["coreVersion"], "12.343");
    }

    #[test]
    fn test_extract_without_folders_writes_no_folders_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("items");
        let report = extract_store(&store(json!({"!items!i": {"name": "Rope"}})), &dest, &stamp())
            .unwrap();
        assert_eq!(report.folders, 0);
        assert!(!dest.join("_folders.json").exists());
    }

    #[test]
    fn test_extract_replaces_existing_tree() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("items");
        fs::create_dir_all(dest.join("Old")).unwrap();
        fs::write(dest.join("Old").join("Stale.json"), "{}").unwrap();

        extract_store(&store(json!({"!items!i": {"name": "Rope"}})), &dest, &stamp()).unwrap();
        assert!(!dest.join("Old").exists());
        assert!(dest.join("Rope.json").exists());
    }

    #[test]
    fn test_extract_disambiguates_name_collisions() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("items");
        let store = store(json!({
            "!items!aaa": {"name": "Torch"},
            "!items!bbb": {"name": "torch"},
        }));

        let report = extract_store(&store, &dest, &stamp()).unwrap();
        assert_eq!(
            report.files,
            vec![PathBuf::from("Torch.json"), PathBuf::from("torch_bbb.json")]
        );
        assert_eq!(report.renamed.len(), 1);
        assert_eq!(read(&dest.join("torch_bbb.json"))["_originalKey"], "!items!bbb");
    }

    #[test]
    fn test_extract_keeps_dot_named_folders_inside_tree() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("actors");
        let store = store(json!({
            "!folders!up": {"name": ".."},
            "!folders!here": {"name": "."},
            "!actors!A1": {"name": "Bob"},
            "!actors!A2": {"name": "Bob", "folder": "up"},
            "!actors!A3": {"name": "Bob", "folder": "here"},
        }));

        let report = extract_store(&store, &dest, &stamp()).unwrap();
        assert_eq!(
            report.files,
            vec![
                PathBuf::from("Bob.json"),
                PathBuf::from("unnamed").join("Bob.json"),
                PathBuf::from("unnamed").join("Bob_A3.json"),
            ]
        );
        assert!(!dir.path().join("Bob.json").exists());
        assert_eq!(read(&dest.join("Bob.json"))["_originalKey"], "!actors!A1");
        assert_eq!(report.renamed.len(), 1);
    }

    #[test]
    fn test_extract_reports_broken_chains_and_orphans() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("items");
        let store = store(json!({
            "!folders!a": {"name": "A", "folder": "b"},
            "!folders!b": {"name": "B", "folder": "a"},
            "!items!i1": {"name": "Looping", "folder": "a"},
            "!items!i2": {"name": "Lost", "folder": "nowhere"},
            "!items.effects!ghost.e1": {"name": "Orphan"},
            "broken key": {"name": "x"},
        }));

        let report = extract_store(&store, &dest, &stamp()).unwrap();
        assert_eq!(report.files_written(), 2);
        assert!(dest.join("B").join("A").join("Looping.json").exists());
        assert!(dest.join("Lost.json").exists());
        assert_eq!(report.broken_chains.len(), 2);
        assert_eq!(report.orphaned, vec!["!items.effects!ghost.e1"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].key, "broken key");
    }

    #[test]
    fn test_run_reads_blob_from_packs_dir() {
        let dir = TempDir::new().unwrap();
        let config = PackConfig::default();
        let paths = PackPaths::new(dir.path(), &config);
        fs::create_dir_all(&paths.packs_dir).unwrap();
        fs::write(
            paths.db_file("items"),
            "\u{feff}{\"!items!i\": {\"name\": \"Rope\"}}",
        )
        .unwrap();

        let result = run(&paths, &config, "items", None).unwrap();
        assert!(paths.source_tree("items").join("Rope.json").exists());
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("Extracted 1 documents")));
    }

    #[test]
    fn test_run_missing_blob_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = PackConfig::default();
        let paths = PackPaths::new(dir.path(), &config);
        assert!(matches!(
            run(&paths, &config, "items", None),
            Err(PackError::DatabaseNotFound(_))
        ));
    }
}
