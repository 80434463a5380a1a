//! Durable crawl cursor
//!
//! The checkpoint is a text file holding one base-10 integer: the next
//! sequential number to process. Enumeration only moves forward, so a single
//! scalar is enough to resume.
//!
//! Saves write a sibling `.tmp` file, sync it and rename it over the
//! checkpoint. A crash leaves either the previous or the new value on disk.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tjpa_common::{Result, TjpaError};
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
    initial: u32,
}

impl CheckpointStore {
    /// `initial` is returned by [`load`](Self::load) while no checkpoint exists.
    pub fn new(path: impl Into<PathBuf>, initial: u32) -> Self {
        Self {
            path: path.into(),
            initial,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next sequential number to process.
    ///
    /// Fails with [`TjpaError::CorruptCheckpoint`] when the file exists but
    /// does not hold an integer; the caller must not fall back to `initial`.
    pub async fn load(&self) -> Result<u32> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    path = %self.path.display(),
                    initial = self.initial,
                    "No checkpoint yet, starting from initial sequence"
                );
                return Ok(self.initial);
            },
            Err(err) => return Err(err.into()),
        };

        content
            .trim()
            .parse::<u32>()
            .map_err(|_| TjpaError::CorruptCheckpoint {
                path: self.path.clone(),
                content,
            })
    }

    /// Replace the stored cursor with `seq`.
    pub async fn save(&self, seq: u32) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(seq.to_string().as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path).await?;
        debug!(path = %self.path.display(), next = seq, "Checkpoint saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}
