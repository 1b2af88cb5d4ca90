//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for every packsmith operation, whatever front end drives it.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Validates pack names** against the configured `available_packs`
//! - **Fans out** to every registered pack when no pack is given
//! - **Dispatches** to the matching `commands::<cmd>::run`
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It never prints and never exits; that is the binary's job.
//!
//! ## Generic Over StoreBackend
//!
//! `PackApi<B: StoreBackend>` is generic over the key-value backend:
//! - Production: `PackApi<SqliteBackend>`
//! - Testing: `PackApi<MemoryBackend>`
//!
//! `extract` and `compile` never touch the backend; only `dump`, `restore`,
//! `checkpack` and `list` do.

use crate::commands::{self, CmdResult, PackPaths};
use crate::config::PackConfig;
use crate::error::Result;
use crate::store::StoreBackend;
use std::path::Path;

pub use crate::commands::{CmdMessage, MessageLevel, PackStatus};

/// Pack used by `extract --file` when no pack is named.
pub const DEFAULT_FILE_PACK: &str = "actors";

/// Pack sampled by `checkpack` when no pack is named.
pub const DEFAULT_CHECK_PACK: &str = "rollTables";

pub struct PackApi<B: StoreBackend> {
    backend: B,
    paths: PackPaths,
    config: PackConfig,
}

impl<B: StoreBackend> PackApi<B> {
    pub fn new(backend: B, root: &Path, config: PackConfig) -> Self {
        let paths = PackPaths::new(root, &config);
        Self {
            backend,
            paths,
            config,
        }
    }

    pub fn paths(&self) -> &PackPaths {
        &self.paths
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Extracts one pack, or every pack when `pack` is `None`.
    ///
    /// With `file`, that blob is extracted instead of `packs/<pack>.db`, into
    /// the tree of `pack` (default [`DEFAULT_FILE_PACK`]).
    pub fn extract(&self, pack: Option<&str>, file: Option<&Path>) -> Result<CmdResult> {
        if let Some(file) = file {
            let pack = match pack {
                Some(name) => self.config.validate_pack(name)?,
                None => self.fallback_pack(DEFAULT_FILE_PACK),
            };
            return commands::extract::run(&self.paths, &self.config, pack, Some(file));
        }
        self.each(pack, "extract", |pack| {
            commands::extract::run(&self.paths, &self.config, pack, None)
        })
    }

    pub fn compile(&self, pack: Option<&str>) -> Result<CmdResult> {
        self.each(pack, "compile", |pack| {
            commands::compile::run(&self.paths, &self.config, pack)
        })
    }

    pub fn dump(&self, pack: Option<&str>) -> Result<CmdResult> {
        self.each(pack, "dump", |pack| {
            commands::dump::run(&self.backend, &self.paths, pack)
        })
    }

    pub fn restore(&self, pack: Option<&str>, backup: bool) -> Result<CmdResult> {
        self.each(pack, "restore", |pack| {
            commands::restore::run(&self.backend, &self.paths, pack, backup)
        })
    }

    pub fn checkpack(&self, pack: Option<&str>) -> Result<CmdResult> {
        let pack = match pack {
            Some(name) => self.config.validate_pack(name)?,
            None => self.fallback_pack(DEFAULT_CHECK_PACK),
        };
        commands::checkpack::run(&self.backend, &self.paths, pack)
    }

    pub fn list(&self) -> Result<CmdResult> {
        commands::list::run(&self.backend, &self.paths, &self.config)
    }

    /// Runs `op` on the named pack, or on every registered pack.
    ///
    /// A single pack's error propagates; in the all-packs case failures are
    /// collected into [`CmdResult::failed_packs`].
    fn each<F>(&self, pack: Option<&str>, verb: &str, mut op: F) -> Result<CmdResult>
    where
        F: FnMut(&str) -> Result<CmdResult>,
    {
        match pack {
            Some(name) => {
                let name = self.config.validate_pack(name)?;
                op(name)
            }
            None => Ok(commands::for_each_pack(
                &self.config.available_packs,
                verb,
                op,
            )),
        }
    }

    /// `preferred` if registered, otherwise the first registered pack.
    fn fallback_pack<'a>(&'a self, preferred: &'a str) -> &'a str {
        self.config
            .validate_pack(preferred)
            .ok()
            .or_else(|| self.config.available_packs.first().map(String::as_str))
            .unwrap_or(preferred)
    }
}
