//! pagecache - Time-bounded disk cache for downloaded pages
//!
//! Pages are fetched once, stored compressed under a content-addressed file
//! name, and served from disk until they exceed a maximum age. Concurrent
//! callers are coordinated through a fixed-size pool of hash-addressed locks.

pub mod cache;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod lock;
pub mod ui;

pub use downloader::{Downloaded, Downloader, Options};
pub use error::{PageCacheError, PageCacheResult};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use lock::LockPool;
