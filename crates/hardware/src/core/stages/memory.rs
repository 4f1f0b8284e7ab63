//! Memory access stage.
//!
//! Loads read through the memory manager into the slot; stores write the
//! source register through. Access counters are maintained by the manager
//! itself. A resolution failure is fatal at process level: the error is
//! logged and propagated so the pipeline terminates the program.

use tracing::error;

use crate::common::MemoryError;
use crate::core::pipeline::Slot;
use crate::isa::Decoded;
use crate::memory::MemoryManager;
use crate::process::{Counters, Pcb};

/// Performs the slot's memory access, if it has one.
pub fn memory_stage(
    slot: &mut Slot,
    pcb: &Pcb,
    mem: &mut MemoryManager,
) -> Result<(), MemoryError> {
    Counters::bump(&pcb.counters.stage_invocations);
    let result = match slot.decoded {
        Some(Decoded::Load { .. }) => match mem.read_logical(slot.alu_out, pcb) {
            Ok(word) => {
                slot.mem_out = word;
                Ok(())
            }
            Err(err) => Err(err),
        },
        Some(Decoded::Store { rt, .. }) => {
            mem.write_logical(slot.alu_out, pcb.regs.read(rt), pcb)
        }
        _ => Ok(()),
    };

    if let Err(err) = &result {
        error!(pid = pcb.pid, addr = slot.alu_out, "memory stage failed: {err}");
    }
    result
}
