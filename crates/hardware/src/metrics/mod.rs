//! Metric collection and reporting.
//!
//! This module turns a finished run into artifacts. It provides:
//! 1. **Per-process reports:** timestamps, turnaround/waiting/response, and
//!    memory/I-O counters for every PCB.
//! 2. **Per-core reports:** running, I/O-wait, and idle tick totals.
//! 3. **Policy aggregates:** average waiting and turnaround, CPU
//!    utilization, throughput, and efficiency for one run.
//! 4. **Temporal snapshots:** CPU and memory usage over time, captured every
//!    few ticks for plotting.
//! 5. **Core comparisons:** single-core baseline versus multicore, with
//!    speedup.
//!
//! Writers emit CSV (hand-formatted, one schema per artifact) and JSON via
//! serde; a failed write is logged and swallowed: metrics never abort a
//! run.

/// Aggregate per-policy metrics and core-count comparisons.
pub mod policy;
/// Per-process and per-core reports plus their writers.
pub mod report;
/// Time-series snapshots of CPU and memory usage.
pub mod temporal;

pub use policy::{CoreComparison, PolicyMetrics};
pub use report::{CoreReport, PcbReport};
pub use temporal::{TemporalCollector, TemporalSnapshot};
