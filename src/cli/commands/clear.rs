//! Clear command - remove every cached page

use super::open_downloader;
use crate::cli::args::CacheDirArgs;
use crate::config::Config;
use crate::error::PageCacheResult;
use crate::ui::{self, UiContext};

/// Execute the clear command
pub fn execute(args: CacheDirArgs, config: &Config) -> PageCacheResult<()> {
    let ctx = UiContext::detect();
    let downloader = open_downloader(config, &args)?;

    downloader.clear()?;
    ui::step_ok_detail(
        &ctx,
        "Cache cleared",
        &downloader.cache_dir().display().to_string(),
    );

    downloader.close()
}
