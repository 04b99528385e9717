//! Configuration schema for pagecache
//!
//! Configuration is stored at `~/.config/pagecache/config.toml`

use crate::lock::DEFAULT_SLOT_COUNT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// HTTP client settings
    pub http: HttpConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory (unset = a fresh temporary directory per run)
    pub dir: Option<PathBuf>,

    /// Entries older than this many seconds are stale (0 = never expire)
    pub max_age_secs: u64,

    /// Keep cached entries when the downloader is closed
    pub keep_on_close: bool,

    /// Number of slots in the lock pool
    pub lock_slots: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: dirs::cache_dir().map(|dir| dir.join("pagecache")),
            max_age_secs: 24 * 60 * 60,
            keep_on_close: true,
            lock_slots: DEFAULT_SLOT_COUNT,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Largest response body accepted, in bytes
    pub max_body_bytes: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("pagecache/", env!("CARGO_PKG_VERSION")).to_string(),
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[http]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.cache.lock_slots, DEFAULT_SLOT_COUNT);
        assert!(config.cache.keep_on_close);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            dir = "/var/cache/pages"
            max_age_secs = 0
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.dir, Some(PathBuf::from("/var/cache/pages")));
        assert_eq!(config.cache.max_age_secs, 0);
        assert_eq!(config.general.log_format, "text"); // default preserved
    }
}
