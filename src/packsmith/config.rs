use crate::error::{PackError, Result};
use crate::model::StatsStamp;
use crate::store::blob;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "packsmith.json";

const DEFAULT_PACKS_DIR: &str = "packs";
const DEFAULT_SOURCE_DIR: &str = "packsrc";
const DEFAULT_CORE_VERSION: &str = "12.343";
const DEFAULT_SYSTEM_ID: &str = "fantastic-depths";

/// Project configuration, stored in `<root>/packsmith.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackConfig {
    /// Directory holding the key-value stores and `.db` blobs, relative to the root
    #[serde(default = "default_packs_dir")]
    pub packs_dir: String,

    /// Directory holding the extracted file trees, relative to the root
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Pack names accepted by `--pack`, in processing order
    #[serde(default = "default_available_packs")]
    pub available_packs: Vec<String>,

    /// `_stats.coreVersion` written on every document
    #[serde(default = "default_core_version")]
    pub core_version: String,

    /// `_stats.systemId` written on every document
    #[serde(default = "default_system_id")]
    pub system_id: String,
}

fn default_packs_dir() -> String {
    DEFAULT_PACKS_DIR.to_string()
}

fn default_source_dir() -> String {
    DEFAULT_SOURCE_DIR.to_string()
}

fn default_available_packs() -> Vec<String> {
    ["actors", "items", "macros", "rollTables", "journals", "scenes"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_core_version() -> String {
    DEFAULT_CORE_VERSION.to_string()
}

fn default_system_id() -> String {
    DEFAULT_SYSTEM_ID.to_string()
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            packs_dir: default_packs_dir(),
            source_dir: default_source_dir(),
            available_packs: default_available_packs(),
            core_version: default_core_version(),
            system_id: default_system_id(),
        }
    }
}

impl PackConfig {
    /// Load config from the given root directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let config_path = root.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(PackError::Io)?;
        let config: PackConfig = serde_json::from_str(blob::strip_bom(&content))
            .map_err(|e| PackError::Config(format!("{}: {}", config_path.display(), e)))?;

        if config.available_packs.is_empty() {
            return Err(PackError::Config(format!(
                "{}: available_packs must not be empty",
                config_path.display()
            )));
        }
        Ok(config)
    }

    pub fn stamp(&self) -> StatsStamp {
        StatsStamp::new(self.core_version.clone(), self.system_id.clone())
    }

    /// Returns the registered pack name, or `InvalidPackName`.
    pub fn validate_pack<'a>(&'a self, name: &str) -> Result<&'a str> {
        self.available_packs
            .iter()
            .find(|p| p.as_str() == name)
            .map(String::as_str)
            .ok_or_else(|| PackError::InvalidPackName {
                name: name.to_string(),
                available: self.available_packs.join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PackConfig::default();
        assert_eq!(config.packs_dir, "packs");
        assert_eq!(config.source_dir, "packsrc");
        assert_eq!(config.available_packs.len(), 6);
        assert_eq!(
            config.stamp(),
            StatsStamp::new("12.343", "fantastic-depths")
        );
    }

    #[test]
    fn test_load_missing_returns_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(PackConfig::load(dir.path()).unwrap(), PackConfig::default());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{"system_id": "my-system", "available_packs": ["monsters"]}"#,
        )
        .unwrap();

        let config = PackConfig::load(dir.path()).unwrap();
        assert_eq!(config.system_id, "my-system");
        assert_eq!(config.core_version, "12.343");
        assert_eq!(config.available_packs, vec!["monsters"]);
    }

    #[test]
    fn test_load_rejects_bad_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(PackConfig::load(dir.path()), Err(PackError::Config(_))));

        fs::write(&path, r#"{"available_packs": []}"#).unwrap();
        assert!(matches!(PackConfig::load(dir.path()), Err(PackError::Config(_))));
    }

    #[test]
    fn test_validate_pack() {
        let config = PackConfig::default();
        assert_eq!(config.validate_pack("rollTables").unwrap(), "rollTables");

        let err = config.validate_pack("spells").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid pack name: spells. Available packs: actors, items, macros, rollTables, journals, scenes"
        );
    }
}
