//! Folder hierarchy resolution and filesystem-safe naming.
//!
//! Folder documents live in the store under `!folders!<id>` and point at their
//! parent through an optional `folder` field. A document's directory in the
//! file tree is the chain of its folder ancestors, root first, each name
//! passed through [`sanitize`].

use crate::key::folder_key;
use crate::model::Document;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Longest folder chain followed before traversal gives up.
pub const MAX_FOLDER_DEPTH: usize = 64;

const UNNAMED: &str = "unnamed";

/// Why a folder chain could not be followed to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokenChain {
    /// The referenced folder id has no `!folders!<id>` document.
    MissingFolder(String),
    /// The chain revisits this folder id.
    Cycle(String),
    /// The chain is longer than [`MAX_FOLDER_DEPTH`].
    TooDeep,
}

impl std::fmt::Display for BrokenChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrokenChain::MissingFolder(id) => {
                write!(f, "folder reference not found: {}", folder_key(id))
            }
            BrokenChain::Cycle(id) => write!(f, "folder cycle detected at {}", folder_key(id)),
            BrokenChain::TooDeep => write!(f, "folder chain deeper than {}", MAX_FOLDER_DEPTH),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Sanitized folder names, root first.
    pub segments: Vec<String>,
    pub broken: Option<BrokenChain>,
}

/// Resolves the folder path of `document` through `folders`.
///
/// A broken chain never fails: the segments gathered before the break are
/// returned and the reason is recorded in [`ResolvedPath::broken`].
pub fn resolve_path(document: &Document, folders: &Map<String, Value>) -> ResolvedPath {
    let mut resolved = ResolvedPath::default();
    let mut visited = HashSet::new();
    let mut current = folder_ref(document);

    while let Some(id) = current {
        if !visited.insert(id.clone()) {
            log::warn!("Folder cycle detected at {}", folder_key(&id));
            resolved.broken = Some(BrokenChain::Cycle(id));
            break;
        }
        if visited.len() > MAX_FOLDER_DEPTH {
            log::warn!("Folder chain exceeds {} levels", MAX_FOLDER_DEPTH);
            resolved.broken = Some(BrokenChain::TooDeep);
            break;
        }

        let folder = match folders.get(&folder_key(&id)).and_then(Value::as_object) {
            Some(folder) => folder,
            None => {
                log::warn!("Folder reference not found: {}", folder_key(&id));
                resolved.broken = Some(BrokenChain::MissingFolder(id));
                break;
            }
        };

        resolved.segments.push(sanitize_value(folder.get("name")));
        current = folder_ref(folder);
    }

    resolved.segments.reverse();
    resolved
}

fn folder_ref(document: &Document) -> Option<String> {
    match document.get("folder") {
        Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
        _ => None,
    }
}

fn is_replaced(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\\' | '/' | '\'' | '&' | '(' | ')'
        )
}

/// Makes a name safe for use as a file or directory name on Windows and Linux.
///
/// The result is never empty and never made only of dots.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if is_replaced(c) { '_' } else { c };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    // "." and ".." would resolve outside the document's own directory.
    let trimmed = out.trim_matches('_').trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        UNNAMED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// [`sanitize`] for a raw field value; anything but a string is unnamed.
pub fn sanitize_value(name: Option<&Value>) -> String {
    match name {
        Some(Value::String(s)) => sanitize(s),
        _ => UNNAMED.to_string(),
    }
}
