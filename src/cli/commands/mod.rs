//! CLI command implementations

pub mod clean;
pub mod clear;
pub mod config;
pub mod get;
pub mod path;

pub use clean::execute as clean;
pub use clear::execute as clear;
pub use config::execute as config;
pub use get::execute as get;
pub use path::execute as path;

use crate::cli::args::CacheDirArgs;
use crate::config::Config;
use crate::downloader::{Downloader, Options};
use crate::error::PageCacheResult;
use crate::lock::LockPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Build a downloader from config, with command-line overrides applied
pub(crate) fn open_downloader(
    config: &Config,
    overrides: &CacheDirArgs,
) -> PageCacheResult<Downloader> {
    let mut options = Options::from(&config.cache);
    if let Some(ref dir) = overrides.cache_dir {
        options.cache_dir = Some(dir.clone());
    }
    if let Some(secs) = overrides.max_age {
        options.max_cache_duration = Duration::from_secs(secs);
    }

    // A per-run temporary directory is never reused, so keeping it only leaks
    let has_dir = options
        .cache_dir
        .as_ref()
        .is_some_and(|dir| !dir.as_os_str().is_empty());
    if !has_dir && options.keep_cache_on_close {
        debug!("No cache directory configured; the temporary one is removed on close");
        options.keep_cache_on_close = false;
    }

    let pool = Arc::new(LockPool::with_slots(config.cache.lock_slots.max(1)));
    Downloader::with_http(options, pool, &config.http)
}
