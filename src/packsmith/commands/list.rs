use crate::commands::{CmdResult, PackPaths, PackStatus};
use crate::config::PackConfig;
use crate::error::Result;
use crate::store::StoreBackend;

/// Reports, for every registered pack, which of its representations exist.
pub fn run<B: StoreBackend>(backend: &B, paths: &PackPaths, config: &PackConfig) -> Result<CmdResult> {
    let statuses = config
        .available_packs
        .iter()
        .map(|pack| PackStatus {
            name: pack.clone(),
            store_exists: backend.exists(&paths.store_dir(pack)),
            db_exists: paths.db_file(pack).is_file(),
            source_exists: paths.source_tree(pack).is_dir(),
        })
        .collect();

    Ok(CmdResult::default().with_pack_statuses(statuses))
}
