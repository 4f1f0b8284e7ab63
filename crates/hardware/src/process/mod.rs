//! Process control blocks and the process arena.
//!
//! This module defines:
//! 1. **[`Pcb`]:** one owned record per loaded program: identity, scheduling
//!    parameters, CPU context, partition binding, program image, counters,
//!    and timestamps.
//! 2. **[`ProcessTable`]:** the arena that owns every PCB. All other
//!    components refer to processes through stable [`ProcId`] handles rather
//!    than references, so ownership stays in one place.
//! 3. **[`Counters`]:** atomic instrumentation counters, incremented through
//!    `&Pcb` from whichever component observes the event.

/// JSON program-file loading.
pub mod loader;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use crate::common::{RegisterBank, Word};

/// Stable handle to a process in the [`ProcessTable`] arena.
///
/// Handles are never reused within a run; events and queues carry them
/// instead of references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcId(pub usize);

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Lifecycle state of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// In the scheduler, waiting for a core.
    #[default]
    Ready,
    /// Occupying exactly one core.
    Running,
    /// In the I/O queue, waiting for a device.
    Blocked,
    /// Completed; counters are stable from here on.
    Finished,
}

/// Per-access cycle cost multipliers, configurable per process file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MemWeights {
    /// Cost of a cache hit.
    #[serde(default = "MemWeights::default_cache")]
    pub cache: u64,
    /// Cost of a primary-store access.
    #[serde(default = "MemWeights::default_primary")]
    pub primary: u64,
    /// Cost of a secondary-store access.
    #[serde(default = "MemWeights::default_secondary")]
    pub secondary: u64,
}

impl MemWeights {
    fn default_cache() -> u64 {
        1
    }

    fn default_primary() -> u64 {
        5
    }

    fn default_secondary() -> u64 {
        10
    }
}

impl Default for MemWeights {
    fn default() -> Self {
        Self {
            cache: 1,
            primary: 5,
            secondary: 10,
        }
    }
}

/// Atomic instrumentation counters carried by each PCB.
///
/// They are incremented during stepping from multiple components (core,
/// memory manager, I/O manager) through a shared `&Pcb`, which is why they
/// are atomics rather than plain integers.
#[derive(Debug, Default)]
pub struct Counters {
    /// Ticks during which the process occupied a pipeline.
    pub pipeline_cycles: AtomicU64,
    /// Individual stage firings (five per full tick in steady state).
    pub stage_invocations: AtomicU64,
    /// Memory-stage and fetch reads issued.
    pub mem_reads: AtomicU64,
    /// Memory-stage writes issued.
    pub mem_writes: AtomicU64,
    /// Total memory operations (reads + writes).
    pub mem_accesses_total: AtomicU64,
    /// Accesses satisfied by the primary store.
    pub primary_accesses: AtomicU64,
    /// Accesses satisfied by the secondary store.
    pub secondary_accesses: AtomicU64,
    /// Accesses that touched the cache.
    pub cache_accesses: AtomicU64,
    /// Weighted memory cycles (per-tier cost multipliers applied).
    pub memory_cycles: AtomicU64,
    /// Cache hits observed for this process.
    pub cache_hits: AtomicU64,
    /// Cache misses observed for this process.
    pub cache_misses: AtomicU64,
    /// Ticks spent blocked on I/O (wait plus service).
    pub io_cycles: AtomicU64,
}

impl Counters {
    /// Records a cache probe outcome.
    #[inline]
    pub fn record_cache(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Convenience relaxed increment.
    #[inline]
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Convenience relaxed add.
    #[inline]
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Relaxed load, for reports.
    #[inline]
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Process control block: one owned record per program.
#[derive(Debug)]
pub struct Pcb {
    /// External process id from the program file.
    pub pid: i32,
    /// Human-readable name.
    pub name: String,

    /// Maximum consecutive ticks on a core; 0 means never preempt.
    pub quantum: u32,
    /// Scheduling priority; higher wins under the priority policy.
    pub priority: i32,
    /// Declared service-time estimate; smaller wins under shortest-job-next.
    pub burst_estimate: u64,
    /// Number of instructions in the code segment.
    pub job_length: u32,

    /// Lifecycle state.
    pub state: State,

    /// CPU context (registers and pc, a logical word index).
    pub regs: RegisterBank,

    /// Index of the owned partition, or -1 when unbound.
    pub partition_id: i32,
    /// Physical base of the owned partition (words).
    pub partition_base: Word,
    /// Size of the owned partition (words).
    pub partition_size: Word,

    /// Initial data-segment values, one word each.
    pub data_segment: Vec<Word>,
    /// Code segment, one 32-bit instruction word each.
    pub code_segment: Vec<Word>,
    /// Label name to instruction index within the code segment.
    pub labels: HashMap<String, Word>,
    /// Data symbol name to word index within the data segment.
    pub data_symbols: HashMap<String, Word>,

    /// Instrumentation counters.
    pub counters: Counters,
    /// Per-access cycle cost multipliers.
    pub mem_weights: MemWeights,

    /// Tick at which the process entered the system.
    pub arrival_time: u64,
    /// Tick of the first dispatch; 0 until dispatched.
    pub start_time: u64,
    /// Tick at which the process finished; 0 until finished.
    pub finish_time: u64,
    /// Turnaround minus service, computed at finish.
    pub wait_time: u64,
    /// First-dispatch delay, computed at first dispatch.
    pub response_time: u64,
}

impl Pcb {
    /// Creates a PCB with empty segments and default parameters.
    pub fn new(pid: i32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            quantum: 0,
            priority: 0,
            burst_estimate: 0,
            job_length: 0,
            state: State::Ready,
            regs: RegisterBank::default(),
            partition_id: -1,
            partition_base: 0,
            partition_size: 0,
            data_segment: Vec::new(),
            code_segment: Vec::new(),
            labels: HashMap::new(),
            data_symbols: HashMap::new(),
            counters: Counters::default(),
            mem_weights: MemWeights::default(),
            arrival_time: 0,
            start_time: 0,
            finish_time: 0,
            wait_time: 0,
            response_time: 0,
        }
    }

    /// Length of the data segment in words.
    pub fn data_len(&self) -> Word {
        self.data_segment.len() as Word
    }

    /// Length of the code segment in words.
    pub fn code_len(&self) -> Word {
        self.code_segment.len() as Word
    }

    /// Total image size: data plus code, in words.
    pub fn image_len(&self) -> Word {
        self.data_len() + self.code_len()
    }

    /// Initial program counter: the first code word, right after the data
    /// segment.
    pub fn initial_pc(&self) -> Word {
        self.data_len()
    }

    /// True once the process has been given a partition.
    pub fn has_partition(&self) -> bool {
        self.partition_id >= 0
    }
}

/// Arena owning every PCB of a run.
///
/// The simulation loop holds the table; cores, the scheduler, and the I/O
/// manager hold [`ProcId`]s and borrow PCBs through it per call.
#[derive(Debug, Default)]
pub struct ProcessTable {
    procs: Vec<Pcb>,
}

impl ProcessTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a PCB, returning its stable handle.
    pub fn insert(&mut self, pcb: Pcb) -> ProcId {
        let id = ProcId(self.procs.len());
        self.procs.push(pcb);
        id
    }

    /// Borrows a PCB.
    ///
    /// # Panics
    ///
    /// Panics if the handle did not come from this table.
    pub fn get(&self, id: ProcId) -> &Pcb {
        &self.procs[id.0]
    }

    /// Mutably borrows a PCB.
    ///
    /// # Panics
    ///
    /// Panics if the handle did not come from this table.
    pub fn get_mut(&mut self, id: ProcId) -> &mut Pcb {
        &mut self.procs[id.0]
    }

    /// Number of processes in the table.
    pub fn len(&self) -> usize {
        self.procs.len()
    }

    /// True when no process has been inserted.
    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    /// Iterates over `(handle, pcb)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ProcId, &Pcb)> {
        self.procs.iter().enumerate().map(|(i, p)| (ProcId(i), p))
    }

    /// Handles of every process, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ProcId> {
        (0..self.procs.len()).map(ProcId)
    }
}
