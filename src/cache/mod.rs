//! Time-bounded, content-addressed page cache
//!
//! One compressed file per canonical URL, stored flat in the cache directory
//! and named by the base-62 SHA-256 of the URL. The filesystem is the only
//! index: every lookup re-derives the path from the key.
//!
//! # Entry States
//!
//! | State | Detected by | Outcome |
//! |-------|-------------|---------|
//! | Missing | `stat` reports not found | Miss |
//! | Stale | file mtime or embedded `created_at` older than max age | Miss, file removed |
//! | Corrupt | decompression or decoding fails | Miss, file removed |
//! | Fresh | both timestamps within max age | Hit |

pub mod entry;
pub mod store;

pub use entry::{decode, encode, CacheEntry};
pub use store::{format_bytes, CacheStore, CACHE_FILE_SUFFIX};
