//! Fixed-capacity pool of hash-addressed mutexes

use super::hasher::{KeyHasher, Sha256Hasher};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// First prime after 2^22. A prime modulus keeps keys that differ only by a
/// short numeric suffix from landing on periodically related slots.
pub const DEFAULT_SLOT_COUNT: usize = 4_194_319;

/// Upper bound on salted candidates tried by [`LockPool::get_unique_locked`]
pub const MAX_UNIQUE_ATTEMPTS: usize = 1 << 11;

/// A held slot. The slot is released when the handle is dropped.
pub struct LockHandle<'a> {
    index: usize,
    _guard: MutexGuard<'a, ()>,
}

impl LockHandle<'_> {
    /// Index of the held slot
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for LockHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockHandle")
            .field("index", &self.index)
            .finish()
    }
}

/// Pool of independently lockable slots addressed by `hash(key) mod N`.
///
/// Slots are allocated once at construction and never added or removed.
/// Share one pool between downloaders with an `Arc`.
pub struct LockPool {
    slots: Box<[Mutex<()>]>,
    hasher: Box<dyn KeyHasher>,
    max_unique_attempts: usize,
}

impl LockPool {
    /// Create a pool with [`DEFAULT_SLOT_COUNT`] slots
    pub fn new() -> Self {
        Self::with_slots(DEFAULT_SLOT_COUNT)
    }

    /// Create a pool with `count` slots, hashed with SHA-256
    pub fn with_slots(count: usize) -> Self {
        Self::with_hasher(count, Sha256Hasher)
    }

    /// Create a pool with a custom key hasher.
    ///
    /// Panics if `count` is zero.
    pub fn with_hasher(count: usize, hasher: impl KeyHasher + 'static) -> Self {
        assert!(count > 0, "lock pool needs at least one slot");
        debug!("Allocating lock pool with {} slots", count);

        let slots = (0..count).map(|_| Mutex::new(())).collect();
        Self {
            slots,
            hasher: Box::new(hasher),
            max_unique_attempts: MAX_UNIQUE_ATTEMPTS,
        }
    }

    /// Override the salted-candidate budget of unique acquisition
    pub fn with_max_unique_attempts(mut self, attempts: usize) -> Self {
        self.max_unique_attempts = attempts;
        self
    }

    /// Number of slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot index for a key
    pub fn index(&self, key: &str) -> usize {
        self.hasher.index(key, self.slots.len())
    }

    /// Block until the slot for `key` is held
    pub fn get_locked(&self, key: &str) -> LockHandle<'_> {
        self.lock_index(self.index(key))
    }

    /// Lock a slot guaranteed to differ from the slots of all `secondary_keys`.
    ///
    /// If the primary key's slot coincides with a secondary slot, salted
    /// candidates (`primary2`, `primary3`, ...) are tried up to the attempt
    /// budget. Returns `None` without locking anything when no distinct slot
    /// was found; the caller must then rely on the locks it already has.
    pub fn get_unique_locked<S: AsRef<str>>(
        &self,
        primary_key: &str,
        secondary_keys: &[S],
    ) -> Option<LockHandle<'_>> {
        let index = self.find_unique_index(primary_key, secondary_keys)?;
        Some(self.lock_index(index))
    }

    fn find_unique_index<S: AsRef<str>>(
        &self,
        primary_key: &str,
        secondary_keys: &[S],
    ) -> Option<usize> {
        let first = self.index(primary_key);
        if secondary_keys.is_empty() {
            return Some(first);
        }

        let taken: HashSet<usize> = secondary_keys
            .iter()
            .map(|key| self.index(key.as_ref()))
            .collect();

        if !taken.contains(&first) {
            return Some(first);
        }

        let mut tried = HashSet::from([first]);

        for attempt in 2..=self.max_unique_attempts {
            let candidate = self.index(&format!("{}{}", primary_key, attempt));
            if !tried.insert(candidate) {
                continue;
            }
            if !taken.contains(&candidate) {
                debug!(
                    "Unique slot for '{}' found after {} attempts",
                    primary_key, attempt
                );
                return Some(candidate);
            }
        }

        warn!(
            "No slot distinct from {} secondary keys for '{}'",
            secondary_keys.len(),
            primary_key
        );
        None
    }

    fn lock_index(&self, index: usize) -> LockHandle<'_> {
        LockHandle {
            index,
            _guard: self.slots[index].lock(),
        }
    }
}

impl Default for LockPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LockPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockPool")
            .field("slots", &self.slots.len())
            .field("max_unique_attempts", &self.max_unique_attempts)
            .finish()
    }
}
