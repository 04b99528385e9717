//! Fetch-or-cache downloader
//!
//! Composes the lock pool, the cache store and a [`Fetcher`]. Every
//! `download` holds a per-URL lock across read, fetch and write, so
//! concurrent callers asking for the same page trigger a single fetch.
//! `clear` and `clean` hold a per-directory lock instead; they do not
//! serialize against in-flight downloads.

use crate::cache::{format_bytes, CacheStore};
use crate::config::{CacheConfig, HttpConfig};
use crate::error::{PageCacheError, PageCacheResult};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::lock::{composite_key, LockPool};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

/// Lock tag for per-URL fetches
const FETCH_TAG: &str = "fetch";
/// Lock tag for directory-wide maintenance (clear and clean)
const CLEAR_TAG: &str = "clear";
/// Lock tag for closing a downloader
const CLOSE_TAG: &str = "close";

/// Name prefix of owned temporary cache directories
const TEMP_DIR_PREFIX: &str = "pagecache-";

/// Attempts at removing an owned directory that downloads keep writing into
const REMOVE_DIR_ATTEMPTS: u32 = 5;

/// Downloader settings, fixed at construction
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Cache directory. `None` (or an empty path) creates and owns a fresh
    /// temporary directory.
    pub cache_dir: Option<PathBuf>,

    /// Maximum age of a cached entry. Zero means entries never expire.
    pub max_cache_duration: Duration,

    /// Keep cache content when the downloader is closed
    pub keep_cache_on_close: bool,
}

impl Options {
    /// Options with a temporary cache directory, no expiry, cleared on close
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `dir` as the cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Expire entries older than `duration`
    pub fn with_max_cache_duration(mut self, duration: Duration) -> Self {
        self.max_cache_duration = duration;
        self
    }

    /// Keep cache content on close
    pub fn with_keep_cache_on_close(mut self, keep: bool) -> Self {
        self.keep_cache_on_close = keep;
        self
    }
}

impl From<&CacheConfig> for Options {
    fn from(config: &CacheConfig) -> Self {
        Self {
            cache_dir: config.dir.clone(),
            max_cache_duration: Duration::from_secs(config.max_age_secs),
            keep_cache_on_close: config.keep_on_close,
        }
    }
}

/// Result of a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    /// Page content
    pub content: Vec<u8>,
    /// Whether the content was served from the cache
    pub from_cache: bool,
}

/// Downloads pages through an on-disk cache
pub struct Downloader {
    cache_dir: PathBuf,
    cache_dir_key: String,
    is_cache_dir_temp: bool,
    keep_cache_on_close: bool,
    store: CacheStore,
    pool: Arc<LockPool>,
    fetcher: Arc<dyn Fetcher>,
}

impl Downloader {
    /// Create a downloader.
    ///
    /// The cache directory is created if missing and made absolute.
    pub fn new(
        options: Options,
        pool: Arc<LockPool>,
        fetcher: Arc<dyn Fetcher>,
    ) -> PageCacheResult<Self> {
        let (cache_dir, is_cache_dir_temp) = match options.cache_dir {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(&dir).map_err(|e| {
                    PageCacheError::io(format!("creating cache directory {}", dir.display()), e)
                })?;
                let dir = std::path::absolute(&dir).map_err(|e| {
                    PageCacheError::io(format!("resolving cache directory {}", dir.display()), e)
                })?;
                (dir, false)
            }
            _ => (create_temp_dir()?, true),
        };

        debug!(
            "Cache directory {} (temporary: {})",
            cache_dir.display(),
            is_cache_dir_temp
        );

        Ok(Self {
            cache_dir_key: cache_dir.to_string_lossy().into_owned(),
            store: CacheStore::new(&cache_dir, options.max_cache_duration),
            cache_dir,
            is_cache_dir_temp,
            keep_cache_on_close: options.keep_cache_on_close,
            pool,
            fetcher,
        })
    }

    /// Create a downloader that fetches over HTTP(S)
    pub fn with_http(
        options: Options,
        pool: Arc<LockPool>,
        http: &HttpConfig,
    ) -> PageCacheResult<Self> {
        Self::new(options, pool, Arc::new(HttpFetcher::new(http)))
    }

    /// Absolute path of the cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Maximum age of cached entries (zero = never expire)
    pub fn max_cache_duration(&self) -> Duration {
        self.store.max_age()
    }

    /// Whether `close` keeps the cache content
    pub fn keep_cache_on_close(&self) -> bool {
        self.keep_cache_on_close
    }

    /// Whether the cache directory was created by this downloader
    pub fn is_cache_dir_temp(&self) -> bool {
        self.is_cache_dir_temp
    }

    /// Cache file path used for `raw_url`
    pub fn cache_path(&self, raw_url: &str) -> PageCacheResult<PathBuf> {
        Ok(self.store.path_for(&canonicalize_url(raw_url)?))
    }

    /// Return the page at `raw_url`, from the cache when a fresh entry
    /// exists, otherwise from the origin (and then cached).
    ///
    /// Non-2xx responses and transport failures are returned as errors and
    /// leave the cache untouched.
    pub fn download(&self, raw_url: &str) -> PageCacheResult<Downloaded> {
        let url = canonicalize_url(raw_url)?;
        let path = self.store.path_for(&url);

        let _lock = self.pool.get_locked(&self.lock_key(FETCH_TAG, Some(&url)));

        if let Some(content) = self.store.read(&path)? {
            info!("Cache hit for {} ({})", url, format_bytes(content.len() as u64));
            return Ok(Downloaded {
                content,
                from_cache: true,
            });
        }

        debug!("Cache miss for {}", url);
        let response = self.fetcher.fetch(&url)?;
        if !response.is_success() {
            return Err(PageCacheError::HttpStatus {
                url,
                status: response.status,
            });
        }

        match self.store.write(&path, &response.body) {
            Ok(()) => info!(
                "Fetched {} ({})",
                url,
                format_bytes(response.body.len() as u64)
            ),
            // A concurrent clear removed the directory under the write
            Err(PageCacheError::Io { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                debug!("Cache cleared while storing {}; serving uncached", url);
            }
            Err(e) => return Err(e),
        }

        Ok(Downloaded {
            content: response.body,
            from_cache: false,
        })
    }

    /// Delete all cached content. An owned temporary directory is removed
    /// entirely; otherwise only cache files are deleted.
    pub fn clear(&self) -> PageCacheResult<()> {
        let _lock = self.pool.get_locked(&self.lock_key(CLEAR_TAG, None));

        if self.is_cache_dir_temp {
            self.remove_temp_dir()?;
            info!("Removed temporary cache directory {}", self.cache_dir.display());
        } else {
            let removed = self.store.clear_all()?;
            info!("Cleared {} cached pages", removed);
        }

        Ok(())
    }

    /// Delete expired entries. Does nothing when entries never expire.
    /// Returns the number of files removed.
    pub fn clean(&self) -> PageCacheResult<usize> {
        if self.store.max_age().is_zero() {
            return Ok(0);
        }

        let _lock = self.pool.get_locked(&self.lock_key(CLEAR_TAG, None));
        let removed = self.store.sweep_expired()?;
        info!("Removed {} expired cached pages", removed);
        Ok(removed)
    }

    /// Close the downloader, clearing the cache unless configured to keep it
    pub fn close(self) -> PageCacheResult<()> {
        if self.keep_cache_on_close {
            return Ok(());
        }

        // The close slot must differ from the clear slot taken inside
        // `clear`, or the nested acquisition would self-deadlock
        let clear_key = self.lock_key(CLEAR_TAG, None);
        let close_lock = self
            .pool
            .get_unique_locked(&self.lock_key(CLOSE_TAG, None), &[clear_key]);
        if close_lock.is_none() {
            debug!("No close slot distinct from clear; relying on the clear lock only");
        }

        self.clear()
    }

    /// Remove the owned directory. In-flight downloads may add files while
    /// it is being removed, so a failed attempt is retried a few times.
    fn remove_temp_dir(&self) -> PageCacheResult<()> {
        let mut attempt = 1;
        loop {
            match fs::remove_dir_all(&self.cache_dir) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(e) if attempt < REMOVE_DIR_ATTEMPTS => {
                    debug!(
                        "Retrying removal of {} after: {}",
                        self.cache_dir.display(),
                        e
                    );
                    attempt += 1;
                }
                Err(e) => {
                    return Err(PageCacheError::io(
                        format!("removing cache directory {}", self.cache_dir.display()),
                        e,
                    ))
                }
            }
        }
    }

    fn lock_key(&self, tag: &str, item: Option<&str>) -> String {
        composite_key(
            [tag, self.cache_dir_key.as_str()]
                .into_iter()
                .chain(item),
        )
    }
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("cache_dir", &self.cache_dir)
            .field("is_cache_dir_temp", &self.is_cache_dir_temp)
            .field("max_cache_duration", &self.store.max_age())
            .field("keep_cache_on_close", &self.keep_cache_on_close)
            .finish_non_exhaustive()
    }
}

/// Parse and re-serialize a URL so equivalent spellings share a cache entry
pub fn canonicalize_url(raw_url: &str) -> PageCacheResult<String> {
    Url::parse(raw_url.trim())
        .map(String::from)
        .map_err(|e| PageCacheError::InvalidUrl {
            url: raw_url.to_string(),
            reason: e.to_string(),
        })
}

fn create_temp_dir() -> PageCacheResult<PathBuf> {
    let dir = std::env::temp_dir().join(format!("{}{}", TEMP_DIR_PREFIX, Uuid::new_v4()));
    fs::create_dir_all(&dir).map_err(|e| {
        PageCacheError::io(format!("creating temporary directory {}", dir.display()), e)
    })?;
    Ok(dir)
}
