//! Append-only log writer
//!
//! Every append opens the log in append mode, writes one complete frame,
//! optionally fsyncs, and closes the handle again. Existing bytes are never
//! rewritten. Callers serialize concurrent appends themselves.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::Record;

/// Writer bound to one log file path.
#[derive(Debug, Clone)]
pub struct LogWriter {
    /// Path to the log file
    path: PathBuf,
    /// fsync after every append
    sync: bool,
}

impl LogWriter {
    /// Creates the log file (and its parent directories) if it does not exist.
    ///
    /// An existing log is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Open` if the directory or file cannot be created.
    pub fn create(path: &Path, sync: bool) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StorageError::Open {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StorageError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            sync,
        })
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether appends are fsynced.
    pub fn is_sync(&self) -> bool {
        self.sync
    }

    /// Appends one record to the end of the log.
    ///
    /// # Returns
    ///
    /// The number of bytes appended.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Open` if the log cannot be opened and
    /// `StorageError::Write` if the write or fsync fails.
    pub fn append(&self, record: &Record) -> StorageResult<usize> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::Open {
                path: self.path.clone(),
                source: e,
            })?;

        let written = record.write_to(&mut file).map_err(|e| StorageError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        if self.sync {
            file.sync_all().map_err(|e| StorageError::Write {
                path: self.path.clone(),
                source: e,
            })?;
        }

        Ok(written)
    }
}
