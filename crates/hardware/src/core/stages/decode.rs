//! Instruction decode stage.

use crate::core::pipeline::Slot;
use crate::isa;
use crate::process::{Counters, Pcb};

/// Decodes the slot's raw word into its typed form.
pub fn decode_stage(slot: &mut Slot, pcb: &Pcb) {
    Counters::bump(&pcb.counters.stage_invocations);
    slot.decoded = Some(isa::decode(slot.raw));
}
