//! Get command - download a page through the cache

use super::open_downloader;
use crate::cache::format_bytes;
use crate::cli::args::GetArgs;
use crate::config::Config;
use crate::downloader::Downloader;
use crate::error::{PageCacheError, PageCacheResult};
use crate::ui::{TaskSpinner, UiContext};
use std::fs;
use std::io::{self, Write};
use tracing::debug;

/// Execute the get command
pub fn execute(args: GetArgs, config: &Config) -> PageCacheResult<()> {
    let ctx = UiContext::detect();
    let downloader = open_downloader(config, &args.cache)?;
    debug!("Using {:?}", downloader);

    let outcome = download_to_output(&ctx, &downloader, &args);
    downloader.close()?;
    outcome
}

fn download_to_output(
    ctx: &UiContext,
    downloader: &Downloader,
    args: &GetArgs,
) -> PageCacheResult<()> {
    let mut spinner = TaskSpinner::new(ctx);
    spinner.start(&format!("Fetching {}", args.url));

    let page = match downloader.download(&args.url) {
        Ok(page) => page,
        Err(e) => {
            spinner.stop_error(&format!("Failed to fetch {}", args.url));
            return Err(e);
        }
    };

    let source = if page.from_cache { "cache" } else { "network" };
    spinner.stop(&format!(
        "{} from {} ({})",
        args.url,
        source,
        format_bytes(page.content.len() as u64)
    ));

    match args.output {
        Some(ref path) => fs::write(path, &page.content)
            .map_err(|e| PageCacheError::io(format!("writing {}", path.display()), e)),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&page.content)
                .and_then(|()| stdout.flush())
                .map_err(|e| PageCacheError::io("writing page to stdout", e))
        }
    }
}
