//! Append-only JSONL audit log
//!
//! One JSON object per line, flushed after every write.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{CashiroError, CashiroResult};

use super::entry::AuditEntry;

pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn log(&self, entry: &AuditEntry) -> CashiroResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with a single flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> CashiroResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| CashiroError::Io(format!("Failed to open audit log: {}", e)))?;

        for entry in entries {
            let line = serde_json::to_string(entry).map_err(|e| {
                CashiroError::Json(format!("Failed to serialize audit entry: {}", e))
            })?;
            writeln!(file, "{}", line)
                .map_err(|e| CashiroError::Io(format!("Failed to write audit entry: {}", e)))?;
        }

        file.flush()
            .map_err(|e| CashiroError::Io(format!("Failed to flush audit log: {}", e)))
    }

    /// All entries, oldest first
    ///
    /// A line that does not parse (for instance a torn final write) is skipped
    /// with a warning instead of hiding the rest of the history.
    pub fn read_all(&self) -> CashiroResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| CashiroError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                CashiroError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(line = index + 1, error = %e, "skipping unreadable audit entry"),
            }
        }

        Ok(entries)
    }

    /// The last `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> CashiroResult<Vec<AuditEntry>> {
        let mut all = self.read_all()?;
        let start = all.len().saturating_sub(count);
        Ok(all.split_off(start))
    }
}
