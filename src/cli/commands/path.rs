//! Path command - show where a URL is cached

use super::open_downloader;
use crate::cli::args::PathArgs;
use crate::config::Config;
use crate::error::PageCacheResult;

/// Execute the path command
pub fn execute(args: PathArgs, config: &Config) -> PageCacheResult<()> {
    let downloader = open_downloader(config, &args.cache)?;
    let path = downloader.cache_path(&args.url)?;
    println!("{}", path.display());
    downloader.close()
}
