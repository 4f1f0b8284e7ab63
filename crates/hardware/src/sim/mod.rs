//! Simulation: the top-level tick loop that owns every component.

/// The simulation driver.
pub mod simulation;

pub use simulation::{admit_all, RunSummary, Simulation};
