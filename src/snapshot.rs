use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::model::{NormalizedJob, RunResult};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path:?} is not a valid snapshot: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RunResult {
    /// Stamp the collected jobs with the current local time.
    pub fn now(jobs: Vec<NormalizedJob>) -> Self {
        RunResult {
            generated_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            jobs,
        }
    }
}

/// Pretty JSON with 4-space indentation. Non-ASCII stays literal.
pub fn encode(doc: &RunResult) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    doc.serialize(&mut ser)?;
    Ok(buf)
}

/// Replace whatever is at `path` with the full document. The document is
/// encoded before the file is touched, so an encode failure leaves any
/// prior file as it was.
pub fn write_snapshot(path: &Path, doc: &RunResult) -> Result<(), WriteError> {
    let bytes = encode(doc)?;
    fs::write(path, bytes).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_snapshot(path: &Path) -> Result<RunResult, SnapshotError> {
    let text = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ──
