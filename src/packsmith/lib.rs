//! # Packsmith Architecture
//!
//! Packsmith converts compendium packs between two shapes:
//!
//! - a **flat store**: one JSON object mapping compound keys such as
//!   `!actors!A1` or `!actors.items!A1.E1` to documents, and
//! - a **file tree**: one pretty-printed JSON file per top-level document,
//!   nested in directories named after its folder chain, with embedded
//!   documents inlined under `embedded`.
//!
//! `extract` goes store → tree, `compile` goes tree → store. Both run every
//! document through the same migration and `_stats` normalization, so
//! `compile(extract(store))` equals the migrated store. `dump` and `restore`
//! move a pack between the host's key-value store and the flat store blob.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, args.rs)                                     │
//! │  - Parses arguments, prints messages, owns the exit code    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Validates pack names, fans out over all packs            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs)                                   │
//! │  - extract, compile, dump, restore, checkpack, list         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (key, organize, folders, migrate) + Storage (store/)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! From `api.rs` inward nothing writes to stdout or stderr; diagnostics go
//! through the `log` facade and results come back as `CmdResult`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: One module per command, plus the shared result types
//! - [`key`]: Compound key parsing and composition
//! - [`organize`]: Grouping embedded documents under their parents and back
//! - [`folders`]: Folder chain resolution and filename sanitizing
//! - [`migrate`]: Per-kind document migration and `_stats` normalization
//! - [`store`]: Blob I/O and the key-value store backends
//! - [`model`]: Shared document types and field names
//! - [`config`]: `packsmith.json` loading
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod folders;
pub mod key;
pub mod migrate;
pub mod model;
pub mod organize;
pub mod store;
