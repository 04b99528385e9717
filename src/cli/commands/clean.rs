//! Clean command - remove expired pages

use super::open_downloader;
use crate::cli::args::CacheDirArgs;
use crate::config::Config;
use crate::error::PageCacheResult;
use crate::ui::{self, UiContext};

/// Execute the clean command
pub fn execute(args: CacheDirArgs, config: &Config) -> PageCacheResult<()> {
    let ctx = UiContext::detect();
    let downloader = open_downloader(config, &args)?;

    if downloader.max_cache_duration().is_zero() {
        ui::step_warn_hint(
            &ctx,
            "Entries never expire, nothing to clean",
            "Set cache.max_age_secs or pass --max-age",
        );
        return downloader.close();
    }

    let removed = downloader.clean()?;
    ui::step_ok_detail(
        &ctx,
        &format!("Removed {} expired page(s)", removed),
        &downloader.cache_dir().display().to_string(),
    );

    downloader.close()
}
