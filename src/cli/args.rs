//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// pagecache - Download pages through a time-bounded disk cache
///
/// Pages are stored compressed, one file per URL, and served from disk
/// until they exceed the configured maximum age.
#[derive(Parser, Debug)]
#[command(name = "pagecache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PAGECACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a page, serving it from the cache when fresh
    Get(GetArgs),

    /// Print the cache file path used for a URL
    Path(PathArgs),

    /// Remove expired pages from the cache
    Clean(CacheDirArgs),

    /// Remove every cached page
    Clear(CacheDirArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Cache location and expiry overrides shared by several commands
#[derive(Parser, Debug, Clone, Default)]
pub struct CacheDirArgs {
    /// Cache directory (overrides cache.dir)
    #[arg(long, env = "PAGECACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Maximum entry age in seconds, 0 = never expire (overrides cache.max_age_secs)
    #[arg(long)]
    pub max_age: Option<u64>,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// URL to download
    pub url: String,

    /// Write the page to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub cache: CacheDirArgs,
}

/// Arguments for the path command
#[derive(Parser, Debug)]
pub struct PathArgs {
    /// URL to locate
    pub url: String,

    #[command(flatten)]
    pub cache: CacheDirArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_get_with_overrides() {
        let cli = Cli::try_parse_from([
            "pagecache",
            "-vv",
            "get",
            "https://example.com/",
            "--cache-dir",
            "/tmp/pages",
            "--max-age",
            "60",
            "-o",
            "page.html",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Get(args) => {
                assert_eq!(args.url, "https://example.com/");
                assert_eq!(args.cache.cache_dir, Some(PathBuf::from("/tmp/pages")));
                assert_eq!(args.cache.max_age, Some(60));
                assert_eq!(args.output, Some(PathBuf::from("page.html")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_config_without_action() {
        let cli = Cli::try_parse_from(["pagecache", "config"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigArgs { action: None })
        ));
    }

    #[test]
    fn get_requires_url() {
        assert!(Cli::try_parse_from(["pagecache", "get"]).is_err());
    }
}
