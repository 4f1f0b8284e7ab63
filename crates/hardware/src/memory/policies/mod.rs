//! Cache replacement policies.
//!
//! Implements the algorithms for selecting victim entries in the shared
//! cache.
//!
//! # Policies
//!
//! - `Fifo`: First-In, First-Out.
//! - `Lru`: Least Recently Used.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;

use crate::common::Word;

/// Trait for cache replacement policies.
///
/// The cache notifies the policy of insertions and hits; on eviction it asks
/// for a victim. A policy tracks each resident address exactly once.
pub trait ReplacementPolicy: Send {
    /// Notes that `addr` was inserted into the cache.
    fn on_insert(&mut self, addr: Word);

    /// Notes that `addr` was accessed while resident.
    fn on_hit(&mut self, addr: Word);

    /// Removes and returns the address to evict, or `None` when the policy
    /// tracks nothing.
    fn pick_victim(&mut self) -> Option<Word>;

    /// Drops all tracked addresses (cache invalidation).
    fn clear(&mut self);
}
