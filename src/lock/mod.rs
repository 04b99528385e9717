//! Sharded lock pool
//!
//! A fixed array of independent mutexes addressed by a 256-bit hash of a
//! composite string key. Memory stays bounded no matter how many distinct
//! keys are locked, at the price of unrelated keys occasionally sharing a
//! slot.
//!
//! # Acquisition modes
//!
//! | Mode | Call | Guarantee |
//! |------|------|-----------|
//! | Plain | [`LockPool::get_locked`] | Blocks until the key's slot is held |
//! | Unique | [`LockPool::get_unique_locked`] | Slot differs from every secondary key's slot, or nothing is locked |

pub mod hasher;
pub mod key;
pub mod pool;

pub use hasher::{KeyHash, KeyHasher, Sha256Hasher};
pub use key::{composite_key, escape_part, KEY_SEPARATOR};
pub use pool::{LockHandle, LockPool, DEFAULT_SLOT_COUNT, MAX_UNIQUE_ATTEMPTS};
