//! Deterministic 256-bit key hashing
//!
//! The same hash drives lock slot selection and cache file naming, so it
//! must be stable across processes. No per-process seed is ever mixed in.

use sha2::{Digest, Sha256};
use std::fmt;

/// Alphabet used for the textual form of a hash (same ordering as `0-9a-zA-Z`)
const BASE62_DIGITS: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of base-62 digits needed to hold any 256-bit value
pub const BASE62_LEN: usize = 43;

/// A 256-bit hash, stored big-endian
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHash([u8; 32]);

impl KeyHash {
    /// Wrap raw big-endian hash bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw big-endian bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Reduce the hash modulo `n`, treating it as one unsigned integer.
    ///
    /// Panics if `n` is zero.
    pub fn modulo(&self, n: usize) -> usize {
        assert!(n > 0, "modulus must be non-zero");
        let n = n as u128;
        // acc < n <= 2^64, so shifting by a byte cannot overflow u128
        self.0
            .iter()
            .fold(0u128, |acc, &byte| ((acc << 8) | u128::from(byte)) % n) as usize
    }

    /// Fixed-length base-62 encoding, left-padded with `0`
    pub fn to_base62(&self) -> String {
        let mut num = self.0;
        let mut digits = [b'0'; BASE62_LEN];

        for digit in digits.iter_mut().rev() {
            let mut rem: u32 = 0;
            for byte in num.iter_mut() {
                let acc = (rem << 8) | u32::from(*byte);
                *byte = (acc / 62) as u8;
                rem = acc % 62;
            }
            *digit = BASE62_DIGITS[rem as usize];
        }

        digits.iter().map(|&b| b as char).collect()
    }
}

impl fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHash({})", hex::encode(self.0))
    }
}

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base62())
    }
}

/// Maps an arbitrary string key to a 256-bit hash.
///
/// Implementations must be deterministic across calls and restarts.
pub trait KeyHasher: Send + Sync {
    /// Hash a key
    fn hash(&self, key: &str) -> KeyHash;

    /// Slot index of a key in a table of `n` slots
    fn index(&self, key: &str, n: usize) -> usize {
        self.hash(key).modulo(n)
    }
}

/// SHA-256 key hasher, used everywhere outside of tests
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl KeyHasher for Sha256Hasher {
    fn hash(&self, key: &str) -> KeyHash {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        KeyHash(hasher.finalize().into())
    }
}
