//! Cache unit tests: lookup, eviction order, write policy, and counters.

use mcsim_core::config::CachePolicyKind;
use mcsim_core::memory::Cache;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::StoreStub;

#[test]
fn get_miss_then_put_then_hit() {
    let mut cache = Cache::new(4);
    let mut store = StoreStub::default();

    assert_eq!(cache.get(100), None);
    cache.put(100, 7, &mut store);
    assert_eq!(cache.get(100), Some(7));
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);
}

/// Capacity 3, fill with 100/200/300, touch each, then insert 400: FIFO
/// evicts 100 and a re-read of 100 misses.
#[test]
fn fifo_evicts_insertion_order() {
    let mut cache = Cache::with_policy(3, CachePolicyKind::Fifo);
    let mut store = StoreStub::default();

    cache.put(100, 1, &mut store);
    cache.put(200, 2, &mut store);
    cache.put(300, 3, &mut store);
    assert_eq!(cache.get(100), Some(1));
    assert_eq!(cache.get(200), Some(2));
    assert_eq!(cache.get(300), Some(3));

    cache.put(400, 4, &mut store);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.get(100), None);
    assert_eq!(cache.get(400), Some(4));
}

/// Under LRU the reads refresh recency, so the victim is the least recently
/// touched address, not the insertion-order head.
#[test]
fn lru_evicts_coldest() {
    let mut cache = Cache::with_policy(3, CachePolicyKind::Lru);
    let mut store = StoreStub::default();

    cache.put(1, 10, &mut store);
    cache.put(2, 20, &mut store);
    cache.put(3, 30, &mut store);
    assert_eq!(cache.get(1), Some(10)); // 2 is now coldest

    cache.put(4, 40, &mut store);
    assert_eq!(cache.get(2), None);
    assert_eq!(cache.get(1), Some(10));
}

#[test]
fn update_on_miss_is_noop() {
    let mut cache = Cache::new(4);
    assert!(!cache.update(55, 99));
    assert!(cache.is_empty());
    assert!(cache.dirty_snapshot().is_empty());
}

#[test]
fn update_marks_dirty_and_eviction_writes_back() {
    let mut cache = Cache::with_policy(2, CachePolicyKind::Fifo);
    let mut store = StoreStub::default();

    cache.put(10, 1, &mut store);
    assert!(cache.update(10, 11));
    cache.put(20, 2, &mut store);
    assert_eq!(cache.dirty_snapshot(), vec![(10, 11)]);

    // Third insert evicts 10, which is dirty: exactly one write-back.
    cache.put(30, 3, &mut store);
    assert_eq!(store.writes, vec![(10, 11)]);
}

#[test]
fn clean_eviction_skips_write_back() {
    let mut cache = Cache::with_policy(1, CachePolicyKind::Fifo);
    let mut store = StoreStub::default();

    cache.put(10, 1, &mut store);
    cache.put(20, 2, &mut store);
    assert!(store.writes.is_empty());
}

#[test]
fn invalidate_drops_everything_without_write_back() {
    let mut cache = Cache::new(4);
    let mut store = StoreStub::default();

    cache.put(1, 1, &mut store);
    assert!(cache.update(1, 2));
    cache.invalidate();

    assert!(cache.is_empty());
    assert!(store.writes.is_empty());
    assert_eq!(cache.get(1), None);
}

#[test]
fn dirty_snapshot_is_sorted_by_address() {
    let mut cache = Cache::new(8);
    let mut store = StoreStub::default();
    for addr in [30, 10, 20] {
        cache.put(addr, addr + 1, &mut store);
        assert!(cache.update(addr, addr + 2));
    }
    assert_eq!(cache.dirty_snapshot(), vec![(10, 12), (20, 22), (30, 32)]);
}

/// Repeated access to a working set smaller than capacity keeps hitting:
/// the hit count grows monotonically with iterations.
#[test]
fn hit_rate_grows_on_small_working_set() {
    let mut cache = Cache::with_policy(8, CachePolicyKind::Lru);
    let mut store = StoreStub::default();
    for addr in 0..4 {
        cache.put(addr, addr, &mut store);
    }

    let mut last_hits = cache.hits();
    for _ in 0..5 {
        for addr in 0..4 {
            assert_eq!(cache.get(addr), Some(addr));
        }
        assert!(cache.hits() > last_hits);
        last_hits = cache.hits();
    }
}

proptest! {
    /// Live entries never exceed capacity, whatever the operation mix.
    #[test]
    fn size_never_exceeds_capacity(
        ops in prop::collection::vec((0u32..32, 0u32..1000, prop::bool::ANY), 1..200),
        capacity in 1usize..16,
    ) {
        let mut cache = Cache::with_policy(capacity, CachePolicyKind::Lru);
        let mut store = StoreStub::default();
        for (addr, data, is_put) in ops {
            if is_put {
                cache.put(addr, data, &mut store);
            } else {
                let _ = cache.update(addr, data);
            }
            prop_assert!(cache.len() <= capacity);
            prop_assert!(cache.dirty_snapshot().len() <= cache.len());
        }
    }
}
