//! Latest-verdict store.
//!
//! One in-memory slot shared by every run in the process, optionally backed
//! by a single record file that is overwritten on each write. Concurrent
//! runs race on the slot and the last writer wins.
//!
//! Reads prefer the record file, so a restarted process still answers with
//! the last persisted run. A missing or corrupt file falls through to the
//! slot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::run::PipelineRun;

/// Errors from the verdict store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No verdict has been recorded yet")]
    NotFound,

    #[error("Failed to access verdict record: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode verdict record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct VerdictStore {
    slot: RwLock<Option<PipelineRun>>,
    path: Option<PathBuf>,
}

impl VerdictStore {
    /// In-memory only.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Slot backed by a record file at `path`.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            slot: RwLock::new(None),
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Overwrite the slot, then the record file.
    ///
    /// The slot is updated even when persisting fails.
    pub fn record(&self, run: &PipelineRun) -> Result<(), StoreError> {
        *self.slot.write() = Some(run.clone());

        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(run)?;
            fs::write(path, json)?;
            debug!(path = %path.display(), "Verdict record written");
        }
        Ok(())
    }

    /// Store an externally supplied run.
    pub fn submit(&self, run: PipelineRun) -> Result<(), StoreError> {
        self.record(&run)
    }

    /// Most recent run: record file, then slot.
    pub fn latest(&self) -> Result<PipelineRun, StoreError> {
        if let Some(run) = self.read_record() {
            return Ok(run);
        }
        self.slot.read().clone().ok_or(StoreError::NotFound)
    }

    fn read_record(&self) -> Option<PipelineRun> {
        let path = self.path.as_ref()?;
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Verdict record unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(run) => Some(run),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Verdict record corrupt, using in-memory slot");
                None
            }
        }
    }
}
