//! # Document Organization
//!
//! The flat store keeps embedded (child) records next to their parents:
//!
//! ```text
//! !actors!A1                 top-level
//! !actors.items!A1.I7        embedded, owned by !actors!A1
//! ```
//!
//! In the file tree each top-level document is one file, and its children are
//! nested under an `embedded` array. Every nested record, and the top-level
//! record itself, carries `_originalKey` so [`reconstruct`] can restore the
//! exact store keys.
//!
//! [`organize`] + [`attach`] go from store to file documents; [`reconstruct`]
//! goes back.

use crate::error::{PackError, Result};
use crate::key::{self, is_folder_key};
use crate::model::{Document, Store, EMBEDDED_FIELD, ORIGINAL_KEY_FIELD};
use serde_json::Value;
use std::collections::HashMap;

/// An embedded record found while organizing, keyed by its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedRecord {
    pub key: String,
    pub document: Document,
    pub child_type: String,
    pub child_id: String,
}

/// A store entry that could not be organized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Organized {
    /// Top-level documents in store order.
    pub top_level: Vec<(String, Document)>,
    /// Embedded records grouped by owner key, each list in store order.
    pub embedded_by_parent: HashMap<String, Vec<EmbeddedRecord>>,
    pub skipped: Vec<SkippedEntry>,
}

/// Top-level documents ready to be written, with children nested.
#[derive(Debug, Default)]
pub struct Attached {
    pub documents: Vec<(String, Document)>,
    /// Embedded records whose owner is not in the store.
    pub orphans: Vec<EmbeddedRecord>,
}

/// Store entries rebuilt from one file-tree document.
#[derive(Debug, Default)]
pub struct Reconstructed {
    /// The top-level entry first, then its embedded entries in file order.
    pub entries: Vec<(String, Document)>,
    /// Embedded entries dropped because they carry no usable `_originalKey`.
    pub missing_keys: usize,
}

/// Splits a store into top-level documents and embedded records.
///
/// Folder documents are left out; they are written separately.
pub fn organize(store: &Store) -> Organized {
    let mut organized = Organized::default();

    for (store_key, value) in store {
        if is_folder_key(store_key) {
            continue;
        }

        let parsed = match key::parse(store_key) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("Skipping entry: {}", err);
                organized.skipped.push(SkippedEntry {
                    key: store_key.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let Some(document) = value.as_object() else {
            log::warn!("Skipping entry {}: value is not a JSON object", store_key);
            organized.skipped.push(SkippedEntry {
                key: store_key.clone(),
                reason: "value is not a JSON object".to_string(),
            });
            continue;
        };

        match (parsed.parent_key(), parsed.embedded) {
            (Some(parent_key), Some(parts)) => {
                organized
                    .embedded_by_parent
                    .entry(parent_key)
                    .or_default()
                    .push(EmbeddedRecord {
                        key: store_key.clone(),
                        document: document.clone(),
                        child_type: parts.child_type,
                        child_id: parts.child_id,
                    });
            }
            _ => organized
                .top_level
                .push((store_key.clone(), document.clone())),
        }
    }

    organized
}

/// Nests each embedded list under its owner and stamps `_originalKey` on
/// every document.
pub fn attach(
    top_level: Vec<(String, Document)>,
    mut embedded_by_parent: HashMap<String, Vec<EmbeddedRecord>>,
) -> Attached {
    let mut attached = Attached::default();

    for (store_key, document) in top_level {
        let mut file_doc = with_original_key(&store_key, document);
        if let Some(children) = embedded_by_parent.remove(&store_key) {
            let entries = children
                .into_iter()
                .map(|child| Value::Object(with_original_key(&child.key, child.document)))
                .collect();
            file_doc.insert(EMBEDDED_FIELD.to_string(), Value::Array(entries));
        }
        attached.documents.push((store_key, file_doc));
    }

    let mut orphan_parents: Vec<String> = embedded_by_parent.keys().cloned().collect();
    orphan_parents.sort();
    for parent in orphan_parents {
        if let Some(children) = embedded_by_parent.remove(&parent) {
            log::warn!(
                "Dropping {} embedded document(s) whose parent {} is not in the store",
                children.len(),
                parent
            );
            attached.orphans.extend(children);
        }
    }

    attached
}

/// Rebuilds store entries from one file-tree document.
///
/// `source` names the document in errors and logs (usually its relative path).
pub fn reconstruct(source: &str, mut document: Document) -> Result<Reconstructed> {
    let store_key = take_original_key(&mut document)
        .ok_or_else(|| PackError::MissingKey(source.to_string()))?;

    let embedded = document.remove(EMBEDDED_FIELD);
    let mut rebuilt = Reconstructed::default();
    rebuilt.entries.push((store_key, document));

    match embedded {
        None | Some(Value::Null) => {}
        Some(Value::Array(children)) => {
            for child in children {
                let Value::Object(mut child) = child else {
                    log::warn!("Embedded entry in {} is not a JSON object", source);
                    rebuilt.missing_keys += 1;
                    continue;
                };
                match take_original_key(&mut child) {
                    Some(child_key) => rebuilt.entries.push((child_key, child)),
                    None => {
                        log::warn!("Embedded document missing _originalKey in {}", source);
                        rebuilt.missing_keys += 1;
                    }
                }
            }
        }
        Some(_) => {
            log::warn!("Ignoring non-array `embedded` field in {}", source);
        }
    }

    Ok(rebuilt)
}

fn with_original_key(store_key: &str, document: Document) -> Document {
    let mut out = Document::new();
    out.insert(
        ORIGINAL_KEY_FIELD.to_string(),
        Value::String(store_key.to_string()),
    );
    for (field, value) in document {
        if field != ORIGINAL_KEY_FIELD {
            out.insert(field, value);
        }
    }
    out
}

fn take_original_key(document: &mut Document) -> Option<String> {
    match document.remove(ORIGINAL_KEY_FIELD) {
        Some(Value::String(key)) if !key.is_empty() => Some(key),
        _ => None,
    }
}
