use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The flat key-value snapshot of a pack. Insertion order is preserved so
/// extraction and compilation are deterministic.
pub type Store = Map<String, Value>;

/// A single record body.
pub type Document = Map<String, Value>;

/// Field holding the store key of a document inside the file tree.
pub const ORIGINAL_KEY_FIELD: &str = "_originalKey";
/// Field holding the embedded children of a top-level document in the file tree.
pub const EMBEDDED_FIELD: &str = "embedded";
/// Field overwritten with the [`StatsStamp`].
pub const STATS_FIELD: &str = "_stats";
/// Reserved file name for folder documents at the root of a pack tree.
pub const FOLDERS_FILE: &str = "_folders.json";

/// Metadata stamp written over `_stats` on every non-folder document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsStamp {
    pub core_version: String,
    pub system_id: String,
}

impl StatsStamp {
    pub fn new(core_version: impl Into<String>, system_id: impl Into<String>) -> Self {
        Self {
            core_version: core_version.into(),
            system_id: system_id.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut stamp = Map::new();
        stamp.insert(
            "coreVersion".to_string(),
            Value::String(self.core_version.clone()),
        );
        stamp.insert("systemId".to_string(), Value::String(self.system_id.clone()));
        Value::Object(stamp)
    }
}

/// JavaScript-style truthiness, used wherever a field counts as "set".
pub fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
