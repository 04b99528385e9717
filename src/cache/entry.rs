//! Cache entry codec
//!
//! An entry is a field-tagged JSON record (`t` = creation time, `c` = payload
//! as hex) wrapped in a gzip stream at maximum compression. Unknown fields
//! are ignored when decoding, so newer writers stay readable.

use crate::error::{PageCacheError, PageCacheResult};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::time::Duration;

/// A cached payload and the moment it was stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the entry was written (UTC, set once)
    #[serde(rename = "t")]
    pub created_at: DateTime<Utc>,

    /// The cached bytes
    #[serde(rename = "c", with = "hex::serde")]
    pub payload: Vec<u8>,
}

impl CacheEntry {
    /// Create an entry stamped with the current time
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            created_at: Utc::now(),
            payload,
        }
    }

    /// Time elapsed since the entry was created.
    ///
    /// Timestamps in the future count as zero age.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Serialize and compress an entry
pub fn encode(entry: &CacheEntry) -> PageCacheResult<Vec<u8>> {
    let json = serde_json::to_vec(entry).map_err(|e| PageCacheError::Encode(e.to_string()))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(&json)
        .map_err(|e| PageCacheError::Encode(format!("compressing entry: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| PageCacheError::Encode(format!("finishing compressed stream: {}", e)))
}

/// Decompress and deserialize an entry.
///
/// Any truncation or corruption yields [`PageCacheError::Decode`].
pub fn decode(bytes: &[u8]) -> PageCacheResult<CacheEntry> {
    if bytes.is_empty() {
        return Err(PageCacheError::Decode("empty cache file".to_string()));
    }

    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(|e| PageCacheError::Decode(format!("decompressing entry: {}", e)))?;

    serde_json::from_slice(&json)
        .map_err(|e| PageCacheError::Decode(format!("parsing entry: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CacheEntry {
        CacheEntry::new(b"<html><body>hello</body></html>".to_vec())
    }

    #[test]
    fn roundtrip_preserves_entry() {
        let entry = sample();
        let decoded = decode(&encode(&entry).unwrap()).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn roundtrip_binary_and_empty_payloads() {
        let binary = CacheEntry::new((0..=255u8).collect());
        assert_eq!(decode(&encode(&binary).unwrap()).unwrap(), binary);

        let empty = CacheEntry::new(Vec::new());
        assert_eq!(decode(&encode(&empty).unwrap()).unwrap(), empty);
    }

    #[test]
    fn encoded_is_gzip() {
        let bytes = encode(&sample()).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn repetitive_payload_compresses() {
        let entry = CacheEntry::new(b"abcdefgh".repeat(4096));
        let bytes = encode(&entry).unwrap();
        assert!(bytes.len() < entry.payload.len() / 10);
    }

    #[test]
    fn truncated_input_fails() {
        let bytes = encode(&sample()).unwrap();
        for cut in [1, 10, bytes.len() / 2, bytes.len() - 1] {
            let err = decode(&bytes[..cut]).unwrap_err();
            assert!(matches!(err, PageCacheError::Decode(_)), "cut at {}", cut);
        }
    }

    #[test]
    fn garbage_input_fails() {
        assert!(matches!(decode(b""), Err(PageCacheError::Decode(_))));
        assert!(matches!(
            decode(b"definitely not gzip"),
            Err(PageCacheError::Decode(_))
        ));
    }

    #[test]
    fn valid_gzip_with_bad_record_fails() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(b"{\"t\": 12}").unwrap();
        let bytes = encoder.finish().unwrap();

        assert!(matches!(decode(&bytes), Err(PageCacheError::Decode(_))));
    }

    #[test]
    fn unknown_fields_ignored() {
        let json = br#"{"t":"2024-05-01T12:00:00Z","c":"6869","etag":"abc"}"#;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(json).unwrap();
        let bytes = encoder.finish().unwrap();

        let entry = decode(&bytes).unwrap();
        assert_eq!(entry.payload, b"hi");
        assert_eq!(entry.created_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn age_of_fresh_and_future_entries() {
        assert!(sample().age() < Duration::from_secs(5));

        let future = CacheEntry {
            created_at: Utc::now() + chrono::Duration::hours(1),
            payload: Vec::new(),
        };
        assert_eq!(future.age(), Duration::ZERO);
    }
}
