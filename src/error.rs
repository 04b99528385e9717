//! Error types for pagecache
//!
//! All modules use `PageCacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pagecache operations
pub type PageCacheResult<T> = Result<T, PageCacheError>;

/// All errors that can occur in pagecache
#[derive(Error, Debug)]
pub enum PageCacheError {
    // Request errors
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    // Cache entry errors
    #[error("Corrupt cache entry: {0}")]
    Decode(String),

    #[error("Failed to encode cache entry: {0}")]
    Encode(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl PageCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a transport error for a URL
    pub fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if the caller may reasonably retry the operation.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidUrl { .. } => Some("URLs must be absolute, e.g. https://example.com/page"),
            Self::ConfigInvalid { .. } => Some("Run: pagecache config init --force"),
            Self::Io { .. } => Some("Check that the cache directory exists and is writable"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PageCacheError::HttpStatus {
            url: "https://example.com/".to_string(),
            status: 404,
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("https://example.com/"));
    }

    #[test]
    fn error_hint() {
        let err = PageCacheError::InvalidUrl {
            url: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(err.hint().is_some());
        assert_eq!(PageCacheError::Decode("x".to_string()).hint(), None);
    }

    #[test]
    fn error_retryable() {
        assert!(PageCacheError::transport("https://a/", "connection reset").is_retryable());
        assert!(PageCacheError::HttpStatus {
            url: "https://a/".to_string(),
            status: 503
        }
        .is_retryable());
        assert!(!PageCacheError::HttpStatus {
            url: "https://a/".to_string(),
            status: 404
        }
        .is_retryable());
        assert!(!PageCacheError::Decode("truncated".to_string()).is_retryable());
    }
}
