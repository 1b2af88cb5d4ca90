use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "packsmith")]
#[command(about = "Convert compendium packs between flat stores and JSON file trees", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root holding packsmith.json, packs/ and packsrc/
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract packs/<pack>.db into packsrc/<pack>/
    Extract {
        /// Pack to extract (all packs if omitted)
        #[arg(short, long)]
        pack: Option<String>,

        /// Extract this blob instead of packs/<pack>.db
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Compile packsrc/<pack>/ into packs/<pack>.db
    Compile {
        /// Pack to compile (all packs if omitted)
        #[arg(short, long)]
        pack: Option<String>,
    },

    /// Dump a pack's key-value store into packs/<pack>.db
    Dump {
        /// Pack to dump (all packs if omitted)
        #[arg(short, long)]
        pack: Option<String>,
    },

    /// Rebuild a pack's key-value store from packs/<pack>.db
    Restore {
        /// Pack to restore (all packs if omitted)
        #[arg(short, long)]
        pack: Option<String>,

        /// Rename the existing store to <dir>.bak-<millis> first
        #[arg(long)]
        backup: bool,
    },

    /// Print the first keys of a pack's key-value store
    #[command(alias = "check")]
    Checkpack {
        /// Pack to check (rollTables if omitted)
        #[arg(short, long)]
        pack: Option<String>,
    },

    /// List registered packs and what exists on disk for each
    #[command(alias = "ls")]
    List,
}
