//! Reading and writing pack JSON text on disk.
//!
//! Every file this crate writes is pretty-printed with two-space indentation
//! and CRLF line endings, so checkouts diff the same on every platform. Whole
//! blobs are written through a temporary sibling file and renamed into place.

use crate::error::{PackError, Result};
use crate::model::Store;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use uuid::Uuid;

const BOM: char = '\u{feff}';

pub fn strip_bom(content: &str) -> &str {
    content.strip_prefix(BOM).unwrap_or(content)
}

/// Normalizes every line ending to `\r\n`.
pub fn to_crlf(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => out.push_str("\r\n"),
            _ => out.push(c),
        }
    }
    out
}

pub fn to_pretty_crlf<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let text = serde_json::to_string_pretty(value).map_err(PackError::Serialization)?;
    Ok(to_crlf(&text))
}

/// Reads a JSON file, tolerating a leading byte-order mark.
pub fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(PackError::Io)?;
    let value = serde_json::from_str(strip_bom(&content)).map_err(PackError::Serialization)?;
    Ok(value)
}

/// Reads a flat store blob. The top level must be a JSON object.
pub fn read_store(path: &Path) -> Result<Store> {
    if !path.is_file() {
        return Err(PackError::DatabaseNotFound(path.to_path_buf()));
    }
    match read_json(path)? {
        Value::Object(store) => Ok(store),
        other => Err(PackError::InvalidStore(format!(
            "expected a JSON object in {}, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

/// Reads a blob for restoring, accepting the legacy array layout.
///
/// Array elements are keyed by `_id`, falling back to `id`; elements with
/// neither are skipped.
pub fn read_entries(path: &Path) -> Result<Store> {
    if !path.is_file() {
        return Err(PackError::DatabaseNotFound(path.to_path_buf()));
    }
    match read_json(path)? {
        Value::Object(store) => Ok(store),
        Value::Array(items) => {
            let mut store = Store::new();
            for item in items {
                let key = item
                    .get("_id")
                    .or_else(|| item.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                match key {
                    Some(key) => {
                        store.insert(key, item);
                    }
                    None => log::warn!("Skipping array entry without _id or id"),
                }
            }
            Ok(store)
        }
        other => Err(PackError::InvalidStore(format!(
            "expected an array or object in {}, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

/// Writes `content` to `path` via a temporary file in the same directory.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent).map_err(PackError::Io)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(".{}-{}.tmp", file_name, Uuid::new_v4()));
    fs::write(&tmp_path, content).map_err(PackError::Io)?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(PackError::Io(err));
    }
    Ok(())
}

pub fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, &to_pretty_crlf(value)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
