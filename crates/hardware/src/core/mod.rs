//! Simulated cores: pipeline, events, and the multicore pool.
//!
//! A [`Core`] holds one process context at a time and advances a 5-stage
//! in-order pipeline one tick per call, producing at most one terminal
//! [`CoreEvent`] per tick. The [`MultiCore`] pool steps every core in a
//! fixed order per global tick, so the workload observes parallelism while
//! the simulation stays deterministic.

/// ALU oracle.
pub mod alu;
/// Core: one process context plus per-core accounting.
#[allow(clippy::module_inception)]
pub mod core;
/// Core pool.
pub mod multicore;
/// The 5-stage windowed pipeline.
pub mod pipeline;
/// Stage bodies (fetch, decode, execute, memory, writeback).
pub mod stages;

pub use self::core::{Core, CoreEvent, CoreEventKind, CoreState};
pub use multicore::MultiCore;
pub use pipeline::Pipeline;

/// Service cost charged for one `print` request, in ticks.
pub const PRINT_COST_TICKS: u64 = 50;
