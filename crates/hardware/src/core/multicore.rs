//! The core pool.
//!
//! Holds N cores and advances all of them one tick at a time, in core order,
//! so runs are deterministic regardless of workload. Assignment pulls from a
//! caller-supplied fetch closure until every idle core is filled or the
//! closure runs dry.

use tracing::warn;

use crate::memory::MemoryManager;
use crate::process::{ProcId, ProcessTable};

use super::core::{Core, CoreEvent};

/// Fixed pool of simulated cores.
#[derive(Debug)]
pub struct MultiCore {
    cores: Vec<Core>,
}

impl MultiCore {
    /// Creates a pool of `n` idle cores.
    pub fn new(n: usize) -> Self {
        Self {
            cores: (0..n).map(Core::new).collect(),
        }
    }

    /// The cores, in id order.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Number of cores in the pool.
    pub fn len(&self) -> usize {
        self.cores.len()
    }

    /// True for an empty pool (never built by the simulator, but the
    /// accessor pair is kept complete).
    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Fills idle cores from `fetch_next`.
    ///
    /// The closure is expected to hand out ready processes (stamping
    /// first-dispatch timestamps as it goes) and return `None` once the
    /// ready queue is empty.
    pub fn assign_ready(
        &mut self,
        procs: &mut ProcessTable,
        fetch_next: &mut dyn FnMut(&mut ProcessTable) -> Option<ProcId>,
    ) {
        for core in &mut self.cores {
            if !core.is_idle() {
                continue;
            }
            let Some(id) = fetch_next(procs) else {
                break;
            };
            if !core.assign(id, procs.get_mut(id)) {
                warn!(core = core.id(), %id, "failed to assign ready process");
            }
        }
    }

    /// Steps every core one tick, in order, returning the terminal events.
    ///
    /// Per-core time counters are updated before each step.
    pub fn step_all(
        &mut self,
        procs: &mut ProcessTable,
        mem: &mut MemoryManager,
    ) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        for core in &mut self.cores {
            core.update_core_time();
            if let Some(event) = core.step_one_cycle(procs, mem) {
                events.push(event);
            }
        }
        events
    }

    /// True while any core is running a process.
    pub fn has_active_cores(&self) -> bool {
        self.cores.iter().any(|c| !c.is_idle())
    }

    /// Number of cores currently running a process.
    pub fn count_active_cores(&self) -> usize {
        self.cores.iter().filter(|c| !c.is_idle()).count()
    }
}
