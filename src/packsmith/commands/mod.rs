use crate::config::PackConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};

pub mod checkpack;
pub mod compile;
pub mod dump;
pub mod extract;
pub mod list;
pub mod restore;

/// Every on-disk location of a project, derived from its root and config.
#[derive(Debug, Clone)]
pub struct PackPaths {
    pub packs_dir: PathBuf,
    pub source_dir: PathBuf,
}

impl PackPaths {
    pub fn new(root: &Path, config: &PackConfig) -> Self {
        Self {
            packs_dir: root.join(&config.packs_dir),
            source_dir: root.join(&config.source_dir),
        }
    }

    /// The flat blob, `packs/<pack>.db`.
    pub fn db_file(&self, pack: &str) -> PathBuf {
        self.packs_dir.join(format!("{}.db", pack))
    }

    /// The key-value store directory, `packs/<pack>/`.
    pub fn store_dir(&self, pack: &str) -> PathBuf {
        self.packs_dir.join(pack)
    }

    /// The extracted file tree, `packsrc/<pack>/`.
    pub fn source_tree(&self, pack: &str) -> PathBuf {
        self.source_dir.join(pack)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Presence of one pack's three representations on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackStatus {
    pub name: String,
    pub store_exists: bool,
    pub db_exists: bool,
    pub source_exists: bool,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub messages: Vec<CmdMessage>,
    pub sampled_keys: Vec<String>,
    pub pack_statuses: Vec<PackStatus>,
    /// Packs that failed during an all-packs run.
    pub failed_packs: Vec<String>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_sampled_keys(mut self, keys: Vec<String>) -> Self {
        self.sampled_keys = keys;
        self
    }

    pub fn with_pack_statuses(mut self, statuses: Vec<PackStatus>) -> Self {
        self.pack_statuses = statuses;
        self
    }

    pub fn merge(&mut self, other: CmdResult) {
        self.messages.extend(other.messages);
        self.sampled_keys.extend(other.sampled_keys);
        self.pack_statuses.extend(other.pack_statuses);
        self.failed_packs.extend(other.failed_packs);
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_packs.is_empty()
    }
}

/// Runs `op` for every pack, collecting per-pack failures instead of
/// stopping at the first one.
pub fn for_each_pack<F>(packs: &[String], verb: &str, mut op: F) -> CmdResult
where
    F: FnMut(&str) -> Result<CmdResult>,
{
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "No pack specified, {} all available packs...",
        present_participle(verb)
    )));

    let mut succeeded = 0;
    for pack in packs {
        match op(pack) {
            Ok(pack_result) => {
                result.merge(pack_result);
                result.add_message(CmdMessage::success(format!(
                    "✓ Successfully {} {}",
                    past_tense(verb),
                    pack
                )));
                succeeded += 1;
            }
            Err(err) => {
                log::error!("Failed to {} {}: {}", verb, pack, err);
                result.add_message(CmdMessage::error(format!(
                    "✗ Failed to {} {}: {}",
                    verb, pack, err
                )));
                result.failed_packs.push(pack.clone());
            }
        }
    }

    result.add_message(CmdMessage::info(format!(
        "Successfully {}: {} pack(s)",
        past_tense(verb),
        succeeded
    )));
    if result.has_failures() {
        result.add_message(CmdMessage::warning(format!(
            "Failed to {}: {} pack(s)",
            verb,
            result.failed_packs.len()
        )));
    }
    result
}

fn past_tense(verb: &str) -> String {
    if verb.ends_with('e') {
        format!("{}d", verb)
    } else {
        format!("{}ed", verb)
    }
}

fn present_participle(verb: &str) -> String {
    match verb.strip_suffix('e') {
        Some(stem) => format!("{}ing", stem),
        None => format!("{}ing", verb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackError;

    #[test]
    fn test_pack_paths() {
        let paths = PackPaths::new(Path::new("/proj"), &PackConfig::default());
        assert_eq!(paths.db_file("actors"), PathBuf::from("/proj/packs/actors.db"));
        assert_eq!(paths.store_dir("actors"), PathBuf::from("/proj/packs/actors"));
        assert_eq!(
            paths.source_tree("actors"),
            PathBuf::from("/proj/packsrc/actors")
        );
    }

    #[test]
    fn test_verb_forms() {
        assert_eq!(past_tense("extract"), "extracted");
        assert_eq!(past_tense("compile"), "compiled");
        assert_eq!(present_participle("compile"), "compiling");
        assert_eq!(present_participle("dump"), "dumping");
    }

    #[test]
    fn test_for_each_pack_collects_failures() {
        let packs = vec!["actors".to_string(), "items".to_string(), "macros".to_string()];
        let mut seen = Vec::new();
        let result = for_each_pack(&packs, "dump", |pack| {
            seen.push(pack.to_string());
            if pack == "items" {
                Err(PackError::DatabaseNotFound(PathBuf::from("items.db")))
            } else {
                Ok(CmdResult::default())
            }
        });

        assert_eq!(seen, packs);
        assert_eq!(result.failed_packs, vec!["items"]);
        assert!(result.has_failures());
        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Error && m.content.contains("items")));
    }
}
