//! Instruction fetch stage.
//!
//! Reads the word at the process's pc through the memory manager. Fetching
//! the end sentinel stops issue without producing a slot; a resolution
//! failure is fatal at process level and ends the program the same way.

use tracing::{error, trace};

use crate::core::pipeline::Slot;
use crate::isa::END_SENTINEL;
use crate::memory::MemoryManager;
use crate::process::{Counters, Pcb};

/// What fetch produced this tick.
#[derive(Debug)]
pub struct FetchResult {
    /// The fetched slot, or a bubble when issue stopped.
    pub slot: Slot,
    /// True when the end sentinel (or a fatal fetch error) was hit.
    pub end_program: bool,
}

/// Fetches one instruction and advances the pc by one word.
pub fn fetch_stage(pcb: &mut Pcb, mem: &mut MemoryManager) -> FetchResult {
    Counters::bump(&pcb.counters.stage_invocations);
    let pc = pcb.regs.pc;

    let raw = match mem.read_logical(pc, pcb) {
        Ok(word) => word,
        Err(err) => {
            error!(pid = pcb.pid, pc, "fetch failed: {err}");
            return FetchResult {
                slot: Slot::bubble(),
                end_program: true,
            };
        }
    };

    if raw == END_SENTINEL {
        trace!(pid = pcb.pid, pc, "end sentinel fetched");
        return FetchResult {
            slot: Slot::bubble(),
            end_program: true,
        };
    }

    pcb.regs.pc = pc + 1;
    FetchResult {
        slot: Slot {
            valid: true,
            pc,
            raw,
            decoded: None,
            alu_out: 0,
            mem_out: 0,
        },
        end_program: false,
    }
}
