//! pagecache - Download pages through a time-bounded disk cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use pagecache::cli::{Cli, Commands};
use pagecache::config::ConfigManager;
use pagecache::error::PageCacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> PageCacheResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load()?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("pagecache=warn"),
        1 => EnvFilter::new("pagecache=info"),
        _ => EnvFilter::new("pagecache=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    debug!("Loaded configuration from {}", config_manager.path().display());

    // Dispatch to command
    match cli.command {
        Commands::Get(args) => pagecache::cli::commands::get(args, &config),
        Commands::Path(args) => pagecache::cli::commands::path(args, &config),
        Commands::Clean(args) => pagecache::cli::commands::clean(args, &config),
        Commands::Clear(args) => pagecache::cli::commands::clear(args, &config),
        Commands::Config(args) => {
            pagecache::cli::commands::config(args, &config, &config_manager)
        }
    }
}
