//! Ready-queue scheduler with four interchangeable policies.
//!
//! One object serves all four policies; the policy is chosen at construction
//! and may be swapped with [`Scheduler::set_policy`] without losing queued
//! processes. The policies:
//! 1. **FCFS:** strict arrival order; priority, quantum, and burst ignored.
//! 2. **RR:** same queue as FCFS: rotation comes from the core emitting a
//!    preemption once the quantum expires, after which the simulation loop
//!    re-adds the process at the tail.
//! 3. **Priority:** highest priority first, insertion order among equals.
//! 4. **SJN:** smallest burst estimate first, insertion order among equals.
//!
//! All operations are total; fetching from an empty queue returns `None`.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::process::{Pcb, ProcId, State};

/// Scheduling policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedPolicy {
    /// First come, first served.
    #[default]
    Fcfs,
    /// Round-robin (quantum-driven rotation).
    Rr,
    /// Highest priority first.
    Priority,
    /// Shortest job next, by declared burst estimate.
    Sjn,
}

impl fmt::Display for SchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fcfs => "fcfs",
            Self::Rr => "rr",
            Self::Priority => "priority",
            Self::Sjn => "sjn",
        };
        f.write_str(name)
    }
}

impl FromStr for SchedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fcfs" => Ok(Self::Fcfs),
            "rr" => Ok(Self::Rr),
            "priority" => Ok(Self::Priority),
            "sjn" => Ok(Self::Sjn),
            other => Err(format!(
                "unknown policy '{other}' (expected fcfs, rr, priority, or sjn)"
            )),
        }
    }
}

/// A queued process with the keys the ordered policies select on.
///
/// The keys are captured at insertion so the queue never has to reach back
/// into the process table.
#[derive(Debug, Clone, Copy)]
struct ReadyEntry {
    id: ProcId,
    priority: i32,
    burst: u64,
}

/// The ready queue.
///
/// One backing deque serves every policy: FCFS/RR pop the front, the ordered
/// policies scan for their extremum (first match wins, which preserves
/// insertion order among equal keys).
#[derive(Debug)]
pub struct Scheduler {
    policy: SchedPolicy,
    ready: VecDeque<ReadyEntry>,
}

impl Scheduler {
    /// Creates an empty scheduler with the given policy.
    pub fn new(policy: SchedPolicy) -> Self {
        Self {
            policy,
            ready: VecDeque::new(),
        }
    }

    /// The active policy.
    pub fn policy(&self) -> SchedPolicy {
        self.policy
    }

    /// Swaps the policy. Queued processes are kept and simply selected under
    /// the new rule from the next fetch on.
    pub fn set_policy(&mut self, policy: SchedPolicy) {
        self.policy = policy;
    }

    /// Enqueues a process, marking it ready.
    pub fn add(&mut self, id: ProcId, pcb: &mut Pcb) {
        pcb.state = State::Ready;
        self.ready.push_back(ReadyEntry {
            id,
            priority: pcb.priority,
            burst: pcb.burst_estimate,
        });
    }

    /// Re-enqueues a process returning from I/O. Identical to [`Self::add`].
    pub fn unblock(&mut self, id: ProcId, pcb: &mut Pcb) {
        self.add(id, pcb);
    }

    /// Removes and returns the next process to run, per policy.
    pub fn fetch_next(&mut self) -> Option<ProcId> {
        let index = match self.policy {
            SchedPolicy::Fcfs | SchedPolicy::Rr => 0,
            SchedPolicy::Priority => self.select_by(|best, e| e.priority > best.priority)?,
            SchedPolicy::Sjn => self.select_by(|best, e| e.burst < best.burst)?,
        };
        self.ready.remove(index).map(|e| e.id)
    }

    /// Index of the entry winning under `beats(best, candidate)`, scanning
    /// front to back; the comparison is strict, so ties keep insertion order.
    fn select_by(&self, beats: impl Fn(&ReadyEntry, &ReadyEntry) -> bool) -> Option<usize> {
        let mut best: Option<(usize, &ReadyEntry)> = None;
        for (i, entry) in self.ready.iter().enumerate() {
            match best {
                None => best = Some((i, entry)),
                Some((_, current)) if beats(current, entry) => best = Some((i, entry)),
                Some(_) => {}
            }
        }
        best.map(|(i, _)| i)
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    /// Number of queued processes.
    pub fn len(&self) -> usize {
        self.ready.len()
    }
}
