//! # Document Migration
//!
//! Best-effort normalization of legacy document shapes. Migration runs on both
//! conversion directions (extract and compile), so every transform must be
//! idempotent: re-compiling extracted data is a no-op.
//!
//! Transforms are registered per [`DocumentKind`]; kinds without a transform
//! pass through untouched. A failing transform never aborts a run: the failure
//! is logged and the unmigrated document is kept.

use crate::error::{PackError, Result};
use crate::key::DocumentKind;
use crate::model::{is_set, Document, StatsStamp, STATS_FIELD};
use serde_json::Value;

type Transform = fn(&mut Document) -> Result<()>;

fn transform_for(kind: &DocumentKind) -> Option<Transform> {
    match kind {
        DocumentKind::TableResult => Some(migrate_table_result),
        _ => None,
    }
}

/// Applies the registered transform for the type encoded in `key`.
pub fn apply_document(key: &str, document: Document) -> Document {
    let kind = DocumentKind::from_key(key);
    let Some(transform) = transform_for(&kind) else {
        return document;
    };

    let mut migrated = document.clone();
    match transform(&mut migrated) {
        Ok(()) => migrated,
        Err(err) => {
            log::debug!("Migration skipped for {}: {}", key, err);
            document
        }
    }
}

/// Overwrites the `_stats` stamp so output does not churn between hosts.
pub fn normalize_stats(document: &mut Document, stamp: &StatsStamp) {
    document.insert(STATS_FIELD.to_string(), stamp.to_value());
}

/// [`apply_document`] followed by [`normalize_stats`].
pub fn migrate(key: &str, document: Document, stamp: &StatsStamp) -> Document {
    let mut migrated = apply_document(key, document);
    normalize_stats(&mut migrated, stamp);
    migrated
}

/// Backports result rows to the `{name, text, description}` shape.
fn migrate_table_result(document: &mut Document) -> Result<()> {
    let kind = match document.get("type") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::String(kind)) => kind.clone(),
        Some(other) => {
            return Err(PackError::Migration {
                key: "tables.results".to_string(),
                reason: format!("unexpected result type {}", other),
            })
        }
    };

    let description_set = is_set(document.get("description"));
    let name_set = is_set(document.get("name"));
    let text_set = is_set(document.get("text"));

    match kind.as_str() {
        "text" => {
            if description_set && !name_set {
                let description = document.get("description").cloned().unwrap_or_default();
                document.insert("name".to_string(), description.clone());
                document.insert("description".to_string(), Value::String(String::new()));
                document.insert("text".to_string(), description);
            } else if description_set && !text_set {
                let description = document.get("description").cloned().unwrap_or_default();
                document.insert("text".to_string(), description);
            }
        }
        "document" => {
            if name_set && !text_set {
                let name = document.get("name").cloned().unwrap_or_default();
                document.insert("text".to_string(), name);
            }
            if text_set && !name_set {
                let text = document.get("text").cloned().unwrap_or_default();
                document.insert("name".to_string(), text);
            }
        }
        _ => {}
    }
    Ok(())
}
