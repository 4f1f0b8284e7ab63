//! JSON program-file loading.
//!
//! One file describes one process: scheduling parameters, memory-access
//! weights, and the program image (data words, code words, and symbol
//! tables). Loading performs:
//! 1. **Parsing:** serde deserialization of the file format.
//! 2. **Derivation:** `job_length` = code words and the initial pc = data
//!    words, so the code segment sits right after the data segment.
//! 3. **File resolution:** explicit paths first, then a scan of
//!    `./processes` and `../processes` for `*.json`.
//!
//! A malformed file is reported and skipped; it never aborts the run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::common::{LoadError, RegisterBank, Word};

use super::{MemWeights, Pcb};

/// On-disk program description.
#[derive(Debug, Deserialize)]
struct ProcessFile {
    #[serde(default)]
    pid: i32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    quantum: u32,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    burst_estimate: u64,
    #[serde(default)]
    mem_weights: MemWeights,
    #[serde(default)]
    program: ProgramImage,
}

/// The `program` block: segments plus symbol tables.
#[derive(Debug, Default, Deserialize)]
struct ProgramImage {
    #[serde(default)]
    data: Vec<Word>,
    #[serde(default)]
    code: Vec<Word>,
    #[serde(default)]
    labels: HashMap<String, Word>,
    #[serde(default)]
    data_symbols: HashMap<String, Word>,
}

/// Loads a single process description.
pub fn load_pcb(path: &Path) -> Result<Pcb, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ProcessFile = serde_json::from_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut pcb = Pcb::new(file.pid, file.name);
    pcb.quantum = file.quantum;
    pcb.priority = file.priority;
    pcb.burst_estimate = file.burst_estimate;
    pcb.mem_weights = file.mem_weights;
    pcb.data_segment = file.program.data;
    pcb.code_segment = file.program.code;
    pcb.labels = file.program.labels;
    pcb.data_symbols = file.program.data_symbols;
    pcb.job_length = pcb.code_len();
    pcb.regs = RegisterBank::new(pcb.initial_pc());
    Ok(pcb)
}

/// Loads every given file, skipping (and logging) the ones that fail.
pub fn load_all(paths: &[PathBuf]) -> Vec<Pcb> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        match load_pcb(path) {
            Ok(pcb) => out.push(pcb),
            Err(err) => warn!("skipping process file: {err}"),
        }
    }
    out
}

/// Resolves process files from CLI arguments.
///
/// Explicit arguments are taken as-is, or relative to `processes/` or
/// `../processes/` when not found directly. With no arguments, every
/// `*.json` under `./processes` (or, failing that, `../processes`) is used.
pub fn resolve_process_files(args: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for arg in args {
        let direct = PathBuf::from(arg);
        let nested = Path::new("processes").join(arg);
        let parent = Path::new("..").join("processes").join(arg);
        if direct.is_file() {
            files.push(direct);
        } else if nested.is_file() {
            files.push(nested);
        } else if parent.is_file() {
            files.push(parent);
        } else if direct.extension().is_some_and(|e| e == "json") {
            // Kept so a bad explicit path surfaces as a load error later.
            files.push(direct);
        }
    }

    if files.is_empty() {
        for dir in ["processes", "../processes"] {
            files.extend(scan_json(Path::new(dir)));
            if !files.is_empty() {
                break;
            }
        }
    }

    files.sort();
    files
}

fn scan_json(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect()
}
