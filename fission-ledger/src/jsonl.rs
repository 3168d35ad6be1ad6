//! Shared append-only JSON-lines writer used by the alert and
//! trade-execution logs: one JSON object per line, flushed on every
//! write so a crash mid-tick never loses the previous line.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::LedgerResult;

/// Opens (or creates) a file for append and guards it with a mutex so a
/// single sink can be shared across tasks without interleaving lines.
pub struct JsonLinesWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesWriter {
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes `record` as one JSON object and appends it as a single
    /// line, flushing immediately.
    pub fn append_line<T: Serialize>(&self, record: &T) -> LedgerResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
