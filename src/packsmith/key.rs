//! # Compound Keys
//!
//! Every record in a pack store is addressed by a compound key:
//!
//! ```text
//! !<type>!<id>                          top-level document
//! !<parentType>.<childType>!<parentId>.<childId>   embedded document
//! ```
//!
//! The type segment never contains `!`. A `.` in the type segment marks the
//! record as embedded, and the id segment must then split into a parent id and
//! a child id. Parsing splits on the first `.` of each segment.

use crate::error::{PackError, Result};
use std::fmt;

const FOLDER_PREFIX: &str = "!folders!";

/// The parent/child halves of an embedded key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedParts {
    pub parent_type: String,
    pub child_type: String,
    pub parent_id: String,
    pub child_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub type_segment: String,
    pub id_segment: String,
    pub embedded: Option<EmbeddedParts>,
}

impl ParsedKey {
    pub fn is_embedded(&self) -> bool {
        self.embedded.is_some()
    }

    /// Key of the top-level document owning this one, if embedded.
    pub fn parent_key(&self) -> Option<String> {
        self.embedded
            .as_ref()
            .map(|parts| compose(&parts.parent_type, &parts.parent_id))
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_type_segment(&self.type_segment)
    }
}

impl fmt::Display for ParsedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", compose(&self.type_segment, &self.id_segment))
    }
}

/// Parses a compound key.
pub fn parse(key: &str) -> Result<ParsedKey> {
    let malformed = || PackError::MalformedKey(key.to_string());

    let rest = key.strip_prefix('!').ok_or_else(malformed)?;
    let (type_segment, id_segment) = rest.split_once('!').ok_or_else(malformed)?;
    if type_segment.is_empty() || id_segment.is_empty() {
        return Err(malformed());
    }

    let embedded = match type_segment.split_once('.') {
        None => None,
        Some((parent_type, child_type)) => {
            let (parent_id, child_id) = id_segment.split_once('.').ok_or_else(malformed)?;
            if parent_type.is_empty()
                || child_type.is_empty()
                || parent_id.is_empty()
                || child_id.is_empty()
            {
                return Err(malformed());
            }
            Some(EmbeddedParts {
                parent_type: parent_type.to_string(),
                child_type: child_type.to_string(),
                parent_id: parent_id.to_string(),
                child_id: child_id.to_string(),
            })
        }
    };

    Ok(ParsedKey {
        type_segment: type_segment.to_string(),
        id_segment: id_segment.to_string(),
        embedded,
    })
}

pub fn compose(type_segment: &str, id: &str) -> String {
    format!("!{}!{}", type_segment, id)
}

pub fn folder_key(id: &str) -> String {
    compose("folders", id)
}

pub fn is_folder_key(key: &str) -> bool {
    key.starts_with(FOLDER_PREFIX)
}

/// The known document types of a pack, derived from a key's type segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Actor,
    Item,
    Macro,
    Table,
    TableResult,
    Journal,
    Scene,
    Folder,
    /// Any other `parent.child` embedded type (effects, pages, tokens...).
    Embedded { parent: String, child: String },
    Unknown(String),
}

impl DocumentKind {
    pub fn from_type_segment(segment: &str) -> Self {
        let lowered = segment.to_lowercase();
        match lowered.as_str() {
            "actors" => DocumentKind::Actor,
            "items" => DocumentKind::Item,
            "macros" => DocumentKind::Macro,
            "tables" => DocumentKind::Table,
            "tables.results" => DocumentKind::TableResult,
            "journal" | "journals" => DocumentKind::Journal,
            "scenes" => DocumentKind::Scene,
            "folders" => DocumentKind::Folder,
            other => match other.split_once('.') {
                Some((parent, child)) => DocumentKind::Embedded {
                    parent: parent.to_string(),
                    child: child.to_string(),
                },
                None => DocumentKind::Unknown(other.to_string()),
            },
        }
    }

    /// Derives the kind from a full key; malformed keys map to `Unknown`.
    pub fn from_key(key: &str) -> Self {
        match parse(key) {
            Ok(parsed) => parsed.kind(),
            Err(_) => DocumentKind::Unknown(String::new()),
        }
    }
}
