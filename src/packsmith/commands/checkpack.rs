use crate::commands::{CmdMessage, CmdResult, PackPaths};
use crate::error::{PackError, Result};
use crate::store::{KeyValueStore, StoreBackend};

/// Number of keys `checkpack` prints.
pub const SAMPLE_SIZE: usize = 20;

/// Samples the first keys of the key-value store of `pack`.
///
/// The count message is meant to be shown after the keys.
pub fn run<B: StoreBackend>(backend: &B, paths: &PackPaths, pack: &str) -> Result<CmdResult> {
    let store_dir = paths.store_dir(pack);
    if !backend.exists(&store_dir) {
        return Err(PackError::StoreNotFound(store_dir));
    }

    let kv = backend.open(&store_dir)?;
    let keys = kv.sample_keys(SAMPLE_SIZE)?;
    log::info!("Sampled {} keys from {}", keys.len(), store_dir.display());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!("sampled keys: {}", keys.len())));
    Ok(result.with_sampled_keys(keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackConfig;
    use crate::store::memory::MemoryBackend;
    use std::path::Path;

    #[test]
    fn test_checkpack_samples_at_most_twenty_keys() {
        let paths = PackPaths::new(Path::new("/proj"), &PackConfig::default());
        let backend = MemoryBackend::new();
        backend.seed(
            &paths.store_dir("rollTables"),
            (0..25).map(|i| (format!("!tables!t{:02}", i), "{}".to_string())),
        );

        let result = run(&backend, &paths, "rollTables").unwrap();
        assert_eq!(result.sampled_keys.len(), SAMPLE_SIZE);
        assert_eq!(result.sampled_keys[0], "!tables!t00");
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].content, "sampled keys: 20");
    }

    #[test]
    fn test_checkpack_missing_store() {
        let paths = PackPaths::new(Path::new("/proj"), &PackConfig::default());
        let backend = MemoryBackend::new();
        assert!(matches!(
            run(&backend, &paths, "items"),
            Err(PackError::StoreNotFound(_))
        ));
        assert!(!backend.exists(&paths.store_dir("items")));
    }
}
