//! Shared test infrastructure.
//!
//! Builders for PCBs and encoded programs, a capturing backing-store stub
//! for cache tests, and a fixture that stands up a process with a bound,
//! loaded partition.

use mcsim_core::common::Word;
use mcsim_core::isa::decode::encode;
use mcsim_core::isa::opcodes;
use mcsim_core::memory::{BackingStore, MemoryManager};
use mcsim_core::process::{Pcb, ProcId, ProcessTable};

/// A PCB with the given scheduling keys and no program.
pub fn sched_pcb(pid: i32, priority: i32, burst: u64) -> Pcb {
    let mut pcb = Pcb::new(pid, format!("proc-{pid}"));
    pcb.priority = priority;
    pcb.burst_estimate = burst;
    pcb
}

/// A PCB carrying the given program image.
pub fn program_pcb(pid: i32, data: Vec<Word>, code: Vec<Word>) -> Pcb {
    let mut pcb = Pcb::new(pid, format!("prog-{pid}"));
    pcb.data_segment = data;
    pcb.code_segment = code;
    pcb.job_length = pcb.code_len();
    pcb.regs = mcsim_core::common::RegisterBank::new(pcb.initial_pc());
    pcb
}

/// Backing-store stub that records write-backs.
#[derive(Debug, Default)]
pub struct StoreStub {
    /// Every `(addr, data)` the cache wrote back, in order.
    pub writes: Vec<(Word, Word)>,
}

impl BackingStore for StoreStub {
    fn write_back(&mut self, addr: Word, data: Word) {
        self.writes.push((addr, data));
    }
}

/// A small memory manager: 1024-word primary store tiled into 256-word
/// partitions, 2048-word secondary store, 8-entry FIFO cache.
pub fn small_memory() -> MemoryManager {
    let mut mem = MemoryManager::new(1024, 2048, 8);
    mem.create_partitions(256);
    mem
}

/// Stands up one process with a bound partition and a loaded image.
pub fn loaded_process(
    data: Vec<Word>,
    code: Vec<Word>,
) -> (ProcessTable, ProcId, MemoryManager) {
    let mut mem = small_memory();
    let mut table = ProcessTable::new();
    let id = table.insert(program_pcb(1, data, code));
    let required = table.get(id).image_len();
    let pcb = table.get_mut(id);
    assert!(mem.allocate_fixed_partition(pcb, required).is_some());
    mem.load_image(table.get(id)).expect("image load");
    (table, id, mem)
}

/// A program of `n` no-ops followed by the end sentinel.
pub fn nop_program(n: usize) -> Vec<Word> {
    let mut code = vec![encode::nop(); n];
    code.push(opcodes::END_SENTINEL);
    code
}
