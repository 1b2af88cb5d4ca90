use clap::Parser;
use colored::*;
use packsmith::api::{CmdMessage, MessageLevel, PackApi, PackStatus};
use packsmith::commands::CmdResult;
use packsmith::config::PackConfig;
use packsmith::error::{PackError, Result};
use packsmith::store::sqlite::SqliteBackend;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = PackConfig::load(&cli.root)?;
    let api = PackApi::new(SqliteBackend, &cli.root, config);

    let (verb, result) = match cli.command {
        Commands::Extract { pack, file } => {
            ("extract", api.extract(pack.as_deref(), file.as_deref())?)
        }
        Commands::Compile { pack } => ("compile", api.compile(pack.as_deref())?),
        Commands::Dump { pack } => ("dump", api.dump(pack.as_deref())?),
        Commands::Restore { pack, backup } => ("restore", api.restore(pack.as_deref(), backup)?),
        Commands::Checkpack { pack } => ("checkpack", api.checkpack(pack.as_deref())?),
        Commands::List => ("list", api.list()?),
    };

    print_result(&result);

    if result.has_failures() {
        return Err(PackError::PacksFailed {
            verb: verb.to_string(),
            count: result.failed_packs.len(),
        });
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn print_result(result: &CmdResult) {
    for key in &result.sampled_keys {
        println!("{}", key);
    }
    print_messages(&result.messages);
    if !result.pack_statuses.is_empty() {
        print_statuses(&result.pack_statuses);
    }
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

const NAME_WIDTH: usize = 12;

fn print_statuses(statuses: &[PackStatus]) {
    println!("{}", "Available packs:".bold());
    for status in statuses {
        println!(
            "  {:<width$} store {}  db {}  source {}",
            status.name,
            mark(status.store_exists),
            mark(status.db_exists),
            mark(status.source_exists),
            width = NAME_WIDTH
        );
    }
}

fn mark(present: bool) -> ColoredString {
    if present {
        "✓".green()
    } else {
        "✗".red()
    }
}
