//! Memory manager: fixed partitions, translation, and tiered access.
//!
//! The manager owns the primary and secondary stores and the shared cache.
//! It tiles the primary store into equal fixed partitions at startup, binds
//! partitions to processes first-fit, resolves logical addresses against the
//! owning partition, and accounts weighted memory cycles on the requesting
//! process's counters.
//!
//! The public `write` both writes through to the store and keeps the cache
//! line current (update on hit, allocate on miss), so a flush never changes
//! the observable final state: the dirty bit matters only for entries
//! mutated through [`Cache::update`] outside this path.

use tracing::debug;

use crate::common::{MemoryError, Word};
use crate::config::{CachePolicyKind, MemoryConfig};
use crate::process::{Counters, Pcb};

use super::cache::Cache;
use super::store::{MemoryTier, StoreBank};

/// One fixed partition of the primary store.
///
/// Partitions tile the primary store contiguously from offset 0. `free`
/// holds exactly when `pid < 0`.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Physical base address (words).
    pub base: Word,
    /// Size (words).
    pub size: Word,
    /// Owning pid, or -1 when free.
    pub pid: i32,
    /// Whether the partition is unowned.
    pub free: bool,
}

impl Partition {
    fn new(base: Word, size: Word) -> Self {
        Self {
            base,
            size,
            pid: -1,
            free: true,
        }
    }
}

/// Owner of the stores, the cache, and the partition table.
#[derive(Debug)]
pub struct MemoryManager {
    stores: StoreBank,
    cache: Cache,
    partitions: Vec<Partition>,
}

impl MemoryManager {
    /// Creates a manager with the given store sizes and a FIFO cache.
    pub fn new(primary_words: Word, secondary_words: Word, cache_capacity: usize) -> Self {
        Self::with_policy(
            primary_words,
            secondary_words,
            cache_capacity,
            CachePolicyKind::Fifo,
        )
    }

    /// Creates a manager with an explicit cache replacement policy.
    pub fn with_policy(
        primary_words: Word,
        secondary_words: Word,
        cache_capacity: usize,
        policy: CachePolicyKind,
    ) -> Self {
        Self {
            stores: StoreBank::new(primary_words, secondary_words),
            cache: Cache::with_policy(cache_capacity, policy),
            partitions: Vec::new(),
        }
    }

    /// Builds a manager from configuration and tiles the partitions.
    pub fn from_config(config: &MemoryConfig) -> Self {
        let mut mgr = Self::with_policy(
            config.primary_words,
            config.secondary_words,
            config.cache_capacity,
            config.cache_policy,
        );
        mgr.create_partitions(config.partition_words);
        mgr
    }

    /// Tiles the primary store into equal free partitions of `size` words,
    /// starting at offset 0. Replaces any previous tiling.
    pub fn create_partitions(&mut self, size: Word) {
        self.partitions.clear();
        if size == 0 {
            return;
        }
        let mut offset = 0;
        while offset + size <= self.stores.primary_limit() {
            self.partitions.push(Partition::new(offset, size));
            offset += size;
        }
    }

    /// First-fit allocation of a free partition of at least `required` words.
    ///
    /// On success the partition is bound to `pcb.pid` and the PCB's binding
    /// fields are filled in; returns the partition index. Returns `None`
    /// when no free partition fits: the caller defers the process.
    pub fn allocate_fixed_partition(&mut self, pcb: &mut Pcb, required: Word) -> Option<usize> {
        for (index, part) in self.partitions.iter_mut().enumerate() {
            if part.free && part.size >= required {
                part.free = false;
                part.pid = pcb.pid;
                pcb.partition_id = index as i32;
                pcb.partition_base = part.base;
                pcb.partition_size = part.size;
                debug!(
                    pid = pcb.pid,
                    partition = index,
                    base = part.base,
                    "partition bound"
                );
                return Some(index);
            }
        }
        None
    }

    /// Frees every partition owned by `pid`.
    pub fn free_partition(&mut self, pid: i32) {
        for part in &mut self.partitions {
            if part.pid == pid {
                part.free = true;
                part.pid = -1;
            }
        }
    }

    /// Translates a logical word index against the partition owned by `pcb`.
    pub fn resolve(&self, logical: Word, pcb: &Pcb) -> Result<Word, MemoryError> {
        for part in &self.partitions {
            if part.pid == pcb.pid {
                if logical >= part.size {
                    return Err(MemoryError::OutOfBounds {
                        logical,
                        size: part.size,
                    });
                }
                return Ok(part.base + logical);
            }
        }
        Err(MemoryError::NoPartition { pid: pcb.pid })
    }

    /// Resolves then reads.
    pub fn read_logical(&mut self, logical: Word, pcb: &Pcb) -> Result<Word, MemoryError> {
        let phys = self.resolve(logical, pcb)?;
        self.read(phys, pcb)
    }

    /// Resolves then writes.
    pub fn write_logical(&mut self, logical: Word, data: Word, pcb: &Pcb) -> Result<(), MemoryError> {
        let phys = self.resolve(logical, pcb)?;
        self.write(phys, data, pcb)
    }

    /// Reads a physical word, cache first.
    ///
    /// On a miss the word comes from the tier that holds it, is installed in
    /// the cache (write-allocate on read miss), and the per-tier weighted
    /// cycles are charged to the process.
    pub fn read(&mut self, addr: Word, pcb: &Pcb) -> Result<Word, MemoryError> {
        let Self { stores, cache, .. } = self;
        let c = &pcb.counters;
        Counters::bump(&c.mem_accesses_total);
        Counters::bump(&c.mem_reads);

        if let Some(word) = cache.get(addr) {
            Counters::bump(&c.cache_accesses);
            Counters::add(&c.memory_cycles, pcb.mem_weights.cache);
            c.record_cache(true);
            return Ok(word);
        }
        c.record_cache(false);

        match stores.tier(addr) {
            MemoryTier::Primary => {
                Counters::bump(&c.primary_accesses);
                Counters::add(&c.memory_cycles, pcb.mem_weights.primary);
            }
            MemoryTier::Secondary => {
                Counters::bump(&c.secondary_accesses);
                Counters::add(&c.memory_cycles, pcb.mem_weights.secondary);
            }
        }
        let word = stores.read(addr)?;
        cache.put(addr, word, stores);
        Ok(word)
    }

    /// Writes a physical word: store first, then the cache line.
    ///
    /// The store write happens unconditionally (write-through); the cache is
    /// then updated on hit or allocated on miss so subsequent reads hit.
    pub fn write(&mut self, addr: Word, data: Word, pcb: &Pcb) -> Result<(), MemoryError> {
        let Self { stores, cache, .. } = self;
        let c = &pcb.counters;
        Counters::bump(&c.mem_accesses_total);
        Counters::bump(&c.mem_writes);

        stores.write(addr, data)?;

        if cache.get(addr).is_some() {
            c.record_cache(true);
            let _ = cache.update(addr, data);
        } else {
            c.record_cache(false);
            cache.put(addr, data, stores);
        }

        Counters::bump(&c.cache_accesses);
        Counters::add(&c.memory_cycles, pcb.mem_weights.cache);
        Ok(())
    }

    /// Loads a process image (data then code) into its partition.
    ///
    /// Loading is setup, not workload traffic: it bypasses the cache and
    /// touches no access counters.
    pub fn load_image(&mut self, pcb: &Pcb) -> Result<(), MemoryError> {
        for (i, &word) in pcb.data_segment.iter().enumerate() {
            let phys = self.resolve(i as Word, pcb)?;
            self.stores.write(phys, word)?;
        }
        let code_base = pcb.data_len();
        for (i, &word) in pcb.code_segment.iter().enumerate() {
            let phys = self.resolve(code_base + i as Word, pcb)?;
            self.stores.write(phys, word)?;
        }
        Ok(())
    }

    /// Writes every dirty cache entry back to the store, then clears the
    /// dirty bits. Called at shutdown.
    pub fn dirty_flush(&mut self) {
        for (addr, data) in self.cache.dirty_snapshot() {
            if let Err(err) = self.stores.write(addr, data) {
                tracing::error!("dirty flush failed at {addr}: {err}");
            }
        }
        self.cache.mark_clean();
    }

    /// The partition table.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Number of occupied partitions.
    pub fn occupied_partitions(&self) -> usize {
        self.partitions.iter().filter(|p| !p.free).count()
    }

    /// Size in words of the largest partition, or 0 with no tiling.
    pub fn largest_partition(&self) -> Word {
        self.partitions.iter().map(|p| p.size).max().unwrap_or(0)
    }

    /// The shared cache (for statistics).
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// First physical address past the primary store.
    pub fn primary_limit(&self) -> Word {
        self.stores.primary_limit()
    }
}
