//! Append-only JSON lines log of discovered processes

use serde_jsonlines::WriteExt;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tjpa_common::{ProcessRecord, Result};

/// One [`ProcessRecord`] per line. Lines are only ever appended.
#[derive(Debug, Clone)]
pub struct OutputLog {
    path: PathBuf,
}

impl OutputLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `records` in order, creating the file on first use.
    ///
    /// Returns only once the lines are synced to disk, so a checkpoint saved
    /// afterwards never points past records that could still be lost.
    pub fn append(&self, records: &[ProcessRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        writer.write_json_lines(records)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Read every record back, oldest first.
    pub fn read_all(&self) -> Result<Vec<ProcessRecord>> {
        let records = serde_jsonlines::json_lines(&self.path)?
            .collect::<std::io::Result<Vec<ProcessRecord>>>()?;
        Ok(records)
    }
}
