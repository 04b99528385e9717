//! On-disk cache store
//!
//! Maps keys to file paths and implements read-with-expiry, write, clear and
//! sweep. Callers are responsible for holding the right lock around each
//! operation; the store itself keeps no state besides its configuration.

use super::entry::{decode, encode, CacheEntry};
use crate::error::{PageCacheError, PageCacheResult};
use crate::lock::{KeyHasher, Sha256Hasher};
use std::fs::{self, File, Metadata};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Suffix of every file owned by the cache. Nothing else in the directory is
/// ever touched.
pub const CACHE_FILE_SUFFIX: &str = ".cache.tmp";

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Flat directory of compressed cache entries
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    max_age: Duration,
}

impl CacheStore {
    /// Create a store over `dir`. A zero `max_age` disables expiry.
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_age,
        }
    }

    /// The cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maximum entry age (zero means entries never expire)
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Deterministic file path for a key
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name = Sha256Hasher.hash(key).to_base62();
        self.dir.join(format!("{}{}", name, CACHE_FILE_SUFFIX))
    }

    /// Read the payload at `path` if present and fresh.
    ///
    /// The file's mtime is checked before reading and the embedded creation
    /// time after decoding; both must be within the max age. Stale and
    /// corrupt files are deleted and reported as a miss.
    pub fn read(&self, path: &Path) -> PageCacheResult<Option<Vec<u8>>> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PageCacheError::io(
                    format!("reading metadata of {}", path.display()),
                    e,
                ))
            }
        };

        if self.is_expired(modified_age(path, &metadata)?) {
            debug!("Cache file {} expired by mtime", path.display());
            remove_if_exists(path)?;
            return Ok(None);
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PageCacheError::io(
                    format!("reading cache file {}", path.display()),
                    e,
                ))
            }
        };

        let entry = match decode(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding cache file {}: {}", path.display(), e);
                remove_if_exists(path)?;
                return Ok(None);
            }
        };

        if self.is_expired(entry.age()) {
            debug!(
                "Cache file {} expired by timestamp {}",
                path.display(),
                entry.created_at
            );
            remove_if_exists(path)?;
            return Ok(None);
        }

        Ok(Some(entry.payload))
    }

    /// Write `payload` to `path` as a fresh entry.
    ///
    /// The entry is written to a hidden sibling file and renamed into place,
    /// so readers see either the old file, the new file, or nothing.
    pub fn write(&self, path: &Path, payload: &[u8]) -> PageCacheResult<()> {
        let bytes = encode(&CacheEntry::new(payload.to_vec()))?;

        let parent = path.parent().unwrap_or(&self.dir);
        fs::create_dir_all(parent).map_err(|e| {
            PageCacheError::io(format!("creating cache directory {}", parent.display()), e)
        })?;

        let tmp = partial_path(path);
        if let Err(e) = write_synced(&tmp, &bytes) {
            remove_if_exists(&tmp).ok();
            return Err(PageCacheError::io(
                format!("writing cache file {}", tmp.display()),
                e,
            ));
        }

        if let Err(e) = fs::rename(&tmp, path) {
            remove_if_exists(&tmp).ok();
            return Err(PageCacheError::io(
                format!("moving cache file into place at {}", path.display()),
                e,
            ));
        }

        debug!(
            "Cached {} at {}",
            format_bytes(payload.len() as u64),
            path.display()
        );
        Ok(())
    }

    /// List every cache file in the directory
    pub fn entries(&self) -> PageCacheResult<Vec<PathBuf>> {
        self.files_matching(|name| name.ends_with(CACHE_FILE_SUFFIX))
    }

    /// List leftover partial files from interrupted writes
    pub fn partials(&self) -> PageCacheResult<Vec<PathBuf>> {
        self.files_matching(is_partial_name)
    }

    fn files_matching(&self, matches: impl Fn(&str) -> bool) -> PageCacheResult<Vec<PathBuf>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PageCacheError::io("reading cache directory", e)),
        };

        let mut paths = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| PageCacheError::io("reading cache entry", e))?;
            let is_match = entry.file_name().to_str().is_some_and(&matches);

            if is_match && entry.file_type().is_ok_and(|t| t.is_file()) {
                paths.push(entry.path());
            }
        }

        Ok(paths)
    }

    /// Delete every cache file, returning how many were removed
    pub fn clear_all(&self) -> PageCacheResult<usize> {
        let mut removed = 0;
        for path in self.entries()? {
            if remove_if_exists(&path)? {
                removed += 1;
            }
        }

        debug!("Removed {} cache files from {}", removed, self.dir.display());
        Ok(removed)
    }

    /// Delete expired and corrupt cache files, plus partial files older than
    /// the max age, returning how many were removed. Does nothing when expiry
    /// is disabled.
    pub fn sweep_expired(&self) -> PageCacheResult<usize> {
        if self.max_age.is_zero() {
            return Ok(0);
        }

        let mut removed = 0;
        for path in self.partials()? {
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(PageCacheError::io(
                        format!("reading metadata of {}", path.display()),
                        e,
                    ))
                }
            };

            if self.is_expired(modified_age(&path, &metadata)?) && remove_if_exists(&path)? {
                debug!("Removed abandoned partial file {}", path.display());
                removed += 1;
            }
        }

        for path in self.entries()? {
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(PageCacheError::io(
                        format!("reading metadata of {}", path.display()),
                        e,
                    ))
                }
            };

            let expired = self.is_expired(modified_age(&path, &metadata)?)
                || match fs::read(&path) {
                    Ok(bytes) => decode(&bytes).map_or(true, |entry| self.is_expired(entry.age())),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                    Err(e) => {
                        return Err(PageCacheError::io(
                            format!("reading cache file {}", path.display()),
                            e,
                        ))
                    }
                };

            if expired && remove_if_exists(&path)? {
                removed += 1;
            }
        }

        debug!("Swept {} expired cache files from {}", removed, self.dir.display());
        Ok(removed)
    }

    fn is_expired(&self, age: Duration) -> bool {
        !self.max_age.is_zero() && age > self.max_age
    }
}

/// Age of a file by mtime. An mtime in the future counts as zero age.
fn modified_age(path: &Path, metadata: &Metadata) -> PageCacheResult<Duration> {
    let modified = metadata.modified().map_err(|e| {
        PageCacheError::io(format!("reading mtime of {}", path.display()), e)
    })?;
    Ok(modified.elapsed().unwrap_or(Duration::ZERO))
}

/// Remove a file, treating "already gone" as success. Returns whether a
/// file was actually removed.
fn remove_if_exists(path: &Path) -> PageCacheResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PageCacheError::io(
            format!("removing cache file {}", path.display()),
            e,
        )),
    }
}

/// Hidden sibling used while writing. It lacks the cache suffix so clear and
/// sweep never pick it up.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.partial", name, Uuid::new_v4()))
}

fn is_partial_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".partial") && name.contains(CACHE_FILE_SUFFIX)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
