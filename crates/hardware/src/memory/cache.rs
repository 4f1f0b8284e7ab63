//! Shared cache with pluggable replacement policy.
//!
//! A bounded map from physical word addresses to cached words, shared by all
//! cores. Writes that go through [`Cache::update`] defer persistence to the
//! backing store until the entry is evicted (write-back) or explicitly
//! flushed; the memory manager's own write path additionally writes through,
//! so the dirty bit is load-bearing only for entries mutated outside that
//! path.

use std::collections::HashMap;

use crate::common::Word;
use crate::config::CachePolicyKind;

use super::policies::{FifoPolicy, LruPolicy, ReplacementPolicy};

/// Sink for dirty entries evicted from the cache.
pub trait BackingStore {
    /// Persists an evicted dirty entry. Must not fail loudly: errors are the
    /// implementor's to log.
    fn write_back(&mut self, addr: Word, data: Word);
}

/// One cached word with its validity and dirty bits.
#[derive(Debug, Clone, Copy)]
pub struct CacheEntry {
    /// The cached word.
    pub data: Word,
    /// Entry holds live data.
    pub valid: bool,
    /// Entry diverges from the backing store.
    pub dirty: bool,
}

/// Bounded address-to-word cache with FIFO or LRU eviction.
///
/// Invariants: at most one entry per address, live entries never exceed
/// capacity, and every resident address is tracked by the policy exactly
/// once.
pub struct Cache {
    capacity: usize,
    map: HashMap<Word, CacheEntry>,
    policy: Box<dyn ReplacementPolicy>,
    hits: u64,
    misses: u64,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

impl Cache {
    /// Creates a cache with the given capacity and FIFO eviction.
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, CachePolicyKind::Fifo)
    }

    /// Creates a cache with the given capacity and replacement policy.
    pub fn with_policy(capacity: usize, kind: CachePolicyKind) -> Self {
        let policy: Box<dyn ReplacementPolicy> = match kind {
            CachePolicyKind::Fifo => Box::new(FifoPolicy::new()),
            CachePolicyKind::Lru => Box::new(LruPolicy::new()),
        };
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            policy,
            hits: 0,
            misses: 0,
        }
    }

    /// Looks up a cached word, counting the probe and refreshing recency on
    /// a hit.
    pub fn get(&mut self, addr: Word) -> Option<Word> {
        match self.map.get(&addr) {
            Some(entry) if entry.valid => {
                self.hits += 1;
                self.policy.on_hit(addr);
                Some(entry.data)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    /// True when the address is resident. Does not count as a probe.
    pub fn contains(&self, addr: Word) -> bool {
        self.map.get(&addr).is_some_and(|e| e.valid)
    }

    /// Installs a word, evicting per policy when full.
    ///
    /// A dirty victim is written back through `store` before removal. When
    /// the address is already resident only its data is refreshed (counts as
    /// an access for recency, keeps the dirty bit). The installed entry is
    /// valid and clean.
    pub fn put(&mut self, addr: Word, data: Word, store: &mut dyn BackingStore) {
        if let Some(entry) = self.map.get_mut(&addr) {
            entry.data = data;
            self.policy.on_hit(addr);
            return;
        }

        if self.map.len() >= self.capacity {
            if let Some(victim) = self.policy.pick_victim() {
                if let Some(entry) = self.map.remove(&victim) {
                    if entry.valid && entry.dirty {
                        store.write_back(victim, entry.data);
                    }
                }
            }
        }

        let _ = self.map.insert(
            addr,
            CacheEntry {
                data,
                valid: true,
                dirty: false,
            },
        );
        self.policy.on_insert(addr);
    }

    /// Overwrites a resident entry and marks it dirty.
    ///
    /// A miss is a no-op (no-write-allocate): the caller either accepts this
    /// or calls [`Cache::put`] explicitly. Returns whether the entry was
    /// resident.
    pub fn update(&mut self, addr: Word, data: Word) -> bool {
        match self.map.get_mut(&addr) {
            Some(entry) => {
                entry.data = data;
                entry.dirty = true;
                self.policy.on_hit(addr);
                true
            }
            None => false,
        }
    }

    /// Drops every entry without writing anything back.
    pub fn invalidate(&mut self) {
        self.map.clear();
        self.policy.clear();
    }

    /// Currently dirty, valid entries as `(addr, data)` pairs, sorted by
    /// address for a deterministic flush order.
    pub fn dirty_snapshot(&self) -> Vec<(Word, Word)> {
        let mut out: Vec<(Word, Word)> = self
            .map
            .iter()
            .filter(|(_, e)| e.valid && e.dirty)
            .map(|(&addr, e)| (addr, e.data))
            .collect();
        out.sort_unstable_by_key(|&(addr, _)| addr);
        out
    }

    /// Clears every dirty bit (after the entries have been flushed).
    pub fn mark_clean(&mut self) {
        for entry in self.map.values_mut() {
            entry.dirty = false;
        }
    }

    /// Cumulative hit count.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Cumulative miss count.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
