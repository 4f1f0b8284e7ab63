//! Configuration system for the simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize a run. It provides:
//! 1. **Defaults:** baseline constants (store sizes, partition size, cache
//!    capacity, I/O timing).
//! 2. **Structures:** hierarchical config for general, memory, I/O, and
//!    output settings.
//! 3. **Enums:** cache replacement policy selection.
//!
//! Configuration is supplied as JSON (deserialized with serde) or built from
//! CLI arguments on top of `Config::default()`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::sched::SchedPolicy;

/// Default configuration constants for the simulator.
///
/// These values define the baseline machine when not explicitly overridden.
mod defaults {
    /// Primary store size in words (4 Ki words).
    pub const PRIMARY_WORDS: u32 = 4096;

    /// Secondary store size in words (8 Ki words).
    pub const SECONDARY_WORDS: u32 = 8192;

    /// Fixed partition size in words.
    ///
    /// The primary store is tiled into `PRIMARY_WORDS / PARTITION_WORDS`
    /// equal partitions at startup.
    pub const PARTITION_WORDS: u32 = 512;

    /// Shared cache capacity in entries.
    pub const CACHE_CAPACITY: usize = 64;

    /// Number of simulated cores.
    pub const NUM_CORES: usize = 4;

    /// Upper bound on the configurable core count.
    pub const MAX_CORES: usize = 8;

    /// Base device latency added to every I/O registration, in ticks.
    pub const IO_LATENCY: u64 = 100;

    /// Ticks of I/O progress per `IoManager::step` call.
    pub const IO_STEP_DELTA: u64 = 10;

    /// Ticks between temporal metric snapshots.
    pub const SNAPSHOT_INTERVAL: u64 = 10;

    /// Safety valve: a run that has not drained by this tick is aborted.
    pub const MAX_TICKS: u64 = 1_000_000;

    /// Root directory for result artifacts.
    pub const OUTPUT_ROOT: &str = "output";
}

/// Cache replacement policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CachePolicyKind {
    /// First In First Out: evicts in strict insertion order.
    #[default]
    #[serde(alias = "Fifo")]
    Fifo,
    /// Least Recently Used: evicts the entry idle the longest.
    #[serde(alias = "Lru")]
    Lru,
}

/// Root configuration structure for a run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General run settings (policy, cores, run bounds).
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory hierarchy parameters.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// I/O subsystem timing.
    #[serde(default)]
    pub io: IoConfig,
    /// Output artifact locations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// General run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Scheduling policy for the run.
    #[serde(default)]
    pub policy: SchedPolicy,

    /// Number of cores; clamped to `[1, 8]`.
    #[serde(default = "GeneralConfig::default_num_cores")]
    pub num_cores: usize,

    /// Ticks between temporal metric snapshots.
    #[serde(default = "GeneralConfig::default_snapshot_interval")]
    pub snapshot_interval: u64,

    /// Abort a run that has not drained by this tick.
    #[serde(default = "GeneralConfig::default_max_ticks")]
    pub max_ticks: u64,
}

impl GeneralConfig {
    fn default_num_cores() -> usize {
        defaults::NUM_CORES
    }

    fn default_snapshot_interval() -> u64 {
        defaults::SNAPSHOT_INTERVAL
    }

    fn default_max_ticks() -> u64 {
        defaults::MAX_TICKS
    }

    /// Clamps a requested core count into the supported range.
    pub fn clamp_cores(n: usize) -> usize {
        n.clamp(1, defaults::MAX_CORES)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            policy: SchedPolicy::default(),
            num_cores: defaults::NUM_CORES,
            snapshot_interval: defaults::SNAPSHOT_INTERVAL,
            max_ticks: defaults::MAX_TICKS,
        }
    }
}

/// Memory hierarchy parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Primary store size in words.
    #[serde(default = "MemoryConfig::default_primary")]
    pub primary_words: u32,

    /// Secondary store size in words.
    #[serde(default = "MemoryConfig::default_secondary")]
    pub secondary_words: u32,

    /// Fixed partition size in words.
    #[serde(default = "MemoryConfig::default_partition")]
    pub partition_words: u32,

    /// Shared cache capacity in entries.
    #[serde(default = "MemoryConfig::default_cache_capacity")]
    pub cache_capacity: usize,

    /// Cache replacement policy.
    #[serde(default)]
    pub cache_policy: CachePolicyKind,
}

impl MemoryConfig {
    fn default_primary() -> u32 {
        defaults::PRIMARY_WORDS
    }

    fn default_secondary() -> u32 {
        defaults::SECONDARY_WORDS
    }

    fn default_partition() -> u32 {
        defaults::PARTITION_WORDS
    }

    fn default_cache_capacity() -> usize {
        defaults::CACHE_CAPACITY
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            primary_words: defaults::PRIMARY_WORDS,
            secondary_words: defaults::SECONDARY_WORDS,
            partition_words: defaults::PARTITION_WORDS,
            cache_capacity: defaults::CACHE_CAPACITY,
            cache_policy: CachePolicyKind::default(),
        }
    }
}

/// I/O subsystem timing.
#[derive(Debug, Clone, Deserialize)]
pub struct IoConfig {
    /// Base device latency added to every registration, in ticks.
    #[serde(default = "IoConfig::default_latency")]
    pub latency: u64,

    /// Ticks of progress per synchronous `step` call.
    #[serde(default = "IoConfig::default_step_delta")]
    pub step_delta: u64,
}

impl IoConfig {
    fn default_latency() -> u64 {
        defaults::IO_LATENCY
    }

    fn default_step_delta() -> u64 {
        defaults::IO_STEP_DELTA
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            latency: defaults::IO_LATENCY,
            step_delta: defaults::IO_STEP_DELTA,
        }
    }
}

/// Output artifact locations.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory for result artifacts.
    #[serde(default = "OutputConfig::default_root")]
    pub root: PathBuf,
}

impl OutputConfig {
    fn default_root() -> PathBuf {
        PathBuf::from(defaults::OUTPUT_ROOT)
    }

    /// Directory for one run's artifacts:
    /// `<root>/policies/<policy>_<N>cores/`.
    pub fn run_dir(&self, policy: SchedPolicy, num_cores: usize) -> PathBuf {
        self.root
            .join("policies")
            .join(format!("{policy}_{num_cores}cores"))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: OutputConfig::default_root(),
        }
    }
}
