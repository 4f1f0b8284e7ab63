//! Memory manager tests: partitions, translation, tiered access, flush.

use mcsim_core::common::MemoryError;
use mcsim_core::process::{Counters, Pcb};
use pretty_assertions::assert_eq;

use crate::common::{program_pcb, small_memory};

#[test]
fn partitions_tile_the_primary_store() {
    let mem = small_memory();
    let parts = mem.partitions();
    assert_eq!(parts.len(), 4);
    for (i, p) in parts.iter().enumerate() {
        assert_eq!(p.base, i as u32 * 256);
        assert_eq!(p.size, 256);
        assert!(p.free);
        assert_eq!(p.pid, -1);
    }
}

/// RAM 1024, partitions of 256: four allocations succeed, the fifth returns
/// absence.
#[test]
fn allocation_exhausts_after_four() {
    let mut mem = small_memory();
    let mut pcbs: Vec<Pcb> = (0..5).map(|i| program_pcb(i, vec![0; 50], vec![0; 50])).collect();

    for pcb in pcbs.iter_mut().take(4) {
        assert!(mem.allocate_fixed_partition(pcb, 100).is_some());
        assert!(pcb.has_partition());
    }
    assert!(mem.allocate_fixed_partition(&mut pcbs[4], 100).is_none());
    assert!(!pcbs[4].has_partition());
}

#[test]
fn free_then_reallocate_same_size_succeeds() {
    let mut mem = small_memory();
    let mut second = program_pcb(2, vec![], vec![0; 10]);

    // Fill all four partitions under pid 1.
    for _ in 0..4 {
        let mut filler = program_pcb(1, vec![], vec![0; 10]);
        assert!(mem.allocate_fixed_partition(&mut filler, 10).is_some());
    }
    assert!(mem.allocate_fixed_partition(&mut second, 10).is_none());

    mem.free_partition(1);
    assert!(mem.allocate_fixed_partition(&mut second, 10).is_some());
}

#[test]
fn resolve_rejects_out_of_bounds_and_unbound() {
    let mut mem = small_memory();
    let mut pcb = program_pcb(7, vec![], vec![0; 10]);

    assert_eq!(
        mem.resolve(0, &pcb),
        Err(MemoryError::NoPartition { pid: 7 })
    );

    assert!(mem.allocate_fixed_partition(&mut pcb, 10).is_some());
    assert!(mem.resolve(255, &pcb).is_ok());
    assert_eq!(
        mem.resolve(256, &pcb),
        Err(MemoryError::OutOfBounds {
            logical: 256,
            size: 256
        })
    );
}

#[test]
fn resolution_adds_partition_base() {
    let mut mem = small_memory();
    let mut a = program_pcb(1, vec![], vec![0; 10]);
    let mut b = program_pcb(2, vec![], vec![0; 10]);
    assert!(mem.allocate_fixed_partition(&mut a, 10).is_some());
    assert!(mem.allocate_fixed_partition(&mut b, 10).is_some());

    assert_eq!(mem.resolve(5, &a), Ok(5));
    assert_eq!(mem.resolve(5, &b), Ok(256 + 5));
}

/// Load, write both segments back through the manager, and read every word:
/// the values round-trip.
#[test]
fn image_round_trips_through_logical_access() {
    let data: Vec<u32> = (0..8).map(|i| i * 11).collect();
    let code: Vec<u32> = (0..8).map(|i| 0xAA00 + i).collect();
    let (table, id, mut mem) = crate::common::loaded_process(data.clone(), code.clone());
    let pcb = table.get(id);

    for (i, &want) in data.iter().enumerate() {
        assert_eq!(mem.read_logical(i as u32, pcb).unwrap(), want);
    }
    for (i, &want) in code.iter().enumerate() {
        assert_eq!(mem.read_logical(8 + i as u32, pcb).unwrap(), want);
    }
}

#[test]
fn read_counts_miss_then_hit() {
    let (table, id, mut mem) = crate::common::loaded_process(vec![42], vec![0]);
    let pcb = table.get(id);

    assert_eq!(mem.read_logical(0, pcb).unwrap(), 42);
    assert_eq!(Counters::get(&pcb.counters.cache_misses), 1);

    assert_eq!(mem.read_logical(0, pcb).unwrap(), 42);
    assert_eq!(Counters::get(&pcb.counters.cache_hits), 1);
    assert_eq!(Counters::get(&pcb.counters.mem_reads), 2);
    assert_eq!(Counters::get(&pcb.counters.mem_accesses_total), 2);
}

#[test]
fn weighted_cycles_follow_the_tier() {
    let (table, id, mut mem) = crate::common::loaded_process(vec![1, 2], vec![0]);
    let pcb = table.get(id);

    // First read misses: primary weight (5). Second hits: cache weight (1).
    let _ = mem.read_logical(0, pcb).unwrap();
    let _ = mem.read_logical(0, pcb).unwrap();
    assert_eq!(Counters::get(&pcb.counters.memory_cycles), 6);
    assert_eq!(Counters::get(&pcb.counters.primary_accesses), 1);
    assert_eq!(Counters::get(&pcb.counters.cache_accesses), 1);
}

/// After a completed write, a flush leaves the store holding the written
/// value.
#[test]
fn write_then_flush_persists() {
    let (mut table, id, mut mem) = crate::common::loaded_process(vec![0; 4], vec![0]);
    mem.write_logical(2, 777, table.get(id)).unwrap();
    mem.dirty_flush();

    let pcb = table.get_mut(id);
    let phys = mem.resolve(2, pcb).unwrap();
    assert_eq!(mem.read(phys, pcb).unwrap(), 777);
}

#[test]
fn write_allocates_into_the_cache() {
    let (table, id, mut mem) = crate::common::loaded_process(vec![0; 4], vec![0]);
    let pcb = table.get(id);

    mem.write_logical(1, 5, pcb).unwrap();
    assert_eq!(Counters::get(&pcb.counters.mem_writes), 1);
    // The following read hits the line the write allocated.
    let _ = mem.read_logical(1, pcb).unwrap();
    assert_eq!(Counters::get(&pcb.counters.cache_hits), 1);
}
