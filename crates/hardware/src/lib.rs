//! Multicore CPU and memory-hierarchy simulator library.
//!
//! This crate implements a deterministic multicore simulator for scheduling
//! experiments with the following:
//! 1. **Cores:** a pool of 5-stage in-order pipelines (Fetch, Decode,
//!    Execute, Memory, Writeback), stepped one tick at a time in a fixed
//!    order.
//! 2. **Memory:** a shared FIFO/LRU cache over a primary store tiled into
//!    fixed partitions, with a secondary store above it and weighted cycle
//!    accounting per process.
//! 3. **Scheduling:** one ready queue with four interchangeable policies
//!    (FCFS, round-robin, priority, shortest-job-next).
//! 4. **I/O:** a non-blocking device queue that re-admits processes through
//!    a ready-callback on completion.
//! 5. **Simulation:** the top-level tick loop, JSON process loading,
//!    configuration, and metric artifacts.

/// Common types (word unit, errors, register bank).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical structures).
pub mod config;
/// Cores, pipeline, stages, and the multicore pool.
pub mod core;
/// Asynchronous I/O subsystem.
pub mod io;
/// Workload instruction set (encodings, decode).
pub mod isa;
/// Memory hierarchy: cache, policies, stores, and the manager.
pub mod memory;
/// Metric collection and artifact writers.
pub mod metrics;
/// Process control blocks, arena, and the JSON loader.
pub mod process;
/// Ready-queue scheduler.
pub mod sched;
/// Simulation driver.
pub mod sim;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The core pool.
pub use crate::core::MultiCore;
/// The I/O subsystem.
pub use crate::io::IoManager;
/// The memory hierarchy owner.
pub use crate::memory::MemoryManager;
/// The ready-queue scheduler.
pub use crate::sched::Scheduler;
/// Top-level simulation driver; owns every component.
pub use crate::sim::Simulation;
