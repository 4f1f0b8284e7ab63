//! Error definitions for the memory hierarchy and the program loader.
//!
//! This module integrates with standard Rust error traits for system-level
//! reporting. It provides:
//! 1. **Memory errors:** Address-resolution and store-access failures.
//! 2. **Loader errors:** I/O and parse failures for program files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the memory manager while resolving or accessing addresses.
///
/// Resolution failures are fatal at process level (the owning process is
/// terminated); they never abort the simulation as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// A logical address fell outside the owning partition.
    #[error("logical address {logical} outside partition of {size} words")]
    OutOfBounds {
        /// The logical word index that was requested.
        logical: u32,
        /// The size of the partition it was resolved against.
        size: u32,
    },

    /// The process owns no partition, so no logical address can be resolved.
    #[error("process {pid} owns no partition")]
    NoPartition {
        /// External pid of the offending process.
        pid: i32,
    },

    /// A physical word index fell outside both the primary and secondary store.
    #[error("physical address {0} outside the address space")]
    BadPhysical(u32),
}

/// Errors raised while loading a process description from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not a valid process description.
    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
