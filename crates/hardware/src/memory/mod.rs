//! Two-level memory hierarchy with a shared write-back cache and fixed
//! partitions.
//!
//! The hierarchy is, from the top:
//! 1. **[`Cache`]:** bounded address-to-word map with pluggable eviction
//!    (FIFO or LRU) shared by every core.
//! 2. **Primary store:** RAM, tiled into equal fixed partitions at startup.
//! 3. **Secondary store:** the swap/disk model, addressed right above the
//!    primary limit.
//!
//! The [`MemoryManager`] owns all three, performs logical-to-physical
//! translation against the owning partition, and accounts weighted memory
//! cycles on the requesting process.

/// Shared cache with pluggable replacement policy.
pub mod cache;
/// Memory manager: partitions, translation, and tiered access.
pub mod manager;
/// Cache replacement policies (FIFO, LRU).
pub mod policies;
/// Word-addressed backing stores.
pub mod store;

pub use cache::{BackingStore, Cache, CacheEntry};
pub use manager::{MemoryManager, Partition};
pub use store::{MemoryTier, StoreBank};
