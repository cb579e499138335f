//! Append-log store
//!
//! The log file is the only state. Every `get` scans it from the start and
//! keeps the last record for the key; every `put`/`delete` appends one frame.
//! No index and no cache: lookups cost O(log size).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::errors::{StoreError, StoreResult};
use super::{check_record_size, Store};
use crate::observability::{DiagnosticSink, Event};
use crate::storage::{LogScanner, LogWriter, Record};

/// Name of the log file inside the base directory
pub const LOG_FILE_NAME: &str = "store.db";

/// Default ceiling on key + value bytes (1 MiB)
pub const DEFAULT_MAX_RECORD_SIZE: usize = 1024 * 1024;

/// Construction options for [`AppendLogStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AolConfig {
    /// Directory holding the log file
    pub base_path: PathBuf,
    /// Ceiling on key + value bytes per record
    pub max_record_size: usize,
    /// Skip the fsync after each append
    pub async_writes: bool,
}

impl AolConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            async_writes: false,
        }
    }

    pub fn with_max_record_size(mut self, max_record_size: usize) -> Self {
        self.max_record_size = max_record_size;
        self
    }

    pub fn with_async_writes(mut self, async_writes: bool) -> Self {
        self.async_writes = async_writes;
        self
    }

    /// Full path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.base_path.join(LOG_FILE_NAME)
    }
}

/// Key-value store over a single append-only log file.
///
/// Use one handle per log file: the lock only serializes callers that share it.
pub struct AppendLogStore {
    writer: LogWriter,
    max_record_size: usize,
    sink: Arc<dyn DiagnosticSink>,
    /// Writers take it exclusively for open-append-close; readers share it
    lock: RwLock<()>,
    closed: AtomicBool,
}

impl AppendLogStore {
    /// Opens the store, creating the base directory and an empty log if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Open` (wrapped) if the log cannot be created.
    pub fn open(config: AolConfig, sink: Arc<dyn DiagnosticSink>) -> StoreResult<Self> {
        let path = config.log_path();
        let writer = LogWriter::create(&path, !config.async_writes)?;

        let max_record_size = config.max_record_size.to_string();
        sink.event(
            Event::StoreOpened,
            &[
                ("async_writes", if config.async_writes { "true" } else { "false" }),
                ("max_record_size", max_record_size.as_str()),
                ("path", path.display().to_string().as_str()),
            ],
        );

        Ok(Self {
            writer,
            max_record_size: config.max_record_size,
            sink,
            lock: RwLock::new(()),
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    pub fn max_record_size(&self) -> usize {
        self.max_record_size
    }

    /// Opens a fresh scanner over the log as it currently is.
    pub fn scan(&self) -> StoreResult<LogScanner<BufReader<File>>> {
        Ok(LogScanner::open(self.path(), self.max_record_size)?)
    }

    fn append(&self, record: &Record) -> StoreResult<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let written = self.writer.append(record)?;

        let bytes = written.to_string();
        self.sink.event(
            Event::RecordAppended,
            &[("bytes", bytes.as_str()), ("kind", record.kind().as_str())],
        );
        Ok(())
    }

    fn reject(&self, err: StoreError) -> StoreError {
        self.sink
            .event(Event::WriteRejected, &[("error", err.to_string().as_str())]);
        err
    }
}

impl Store for AppendLogStore {
    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);

        let mut scanner = self.scan()?;
        let mut found = None;
        for record in scanner.by_ref() {
            if record.key() == key.as_bytes() {
                found = Some(record);
            }
        }

        if let Some(err) = scanner.error() {
            let offset = scanner.offset().to_string();
            self.sink.event(
                Event::ScanFailed,
                &[("error", err.to_string().as_str()), ("offset", offset.as_str())],
            );
        }
        scanner.finish()?;

        match found {
            Some(record) if !record.is_tombstone() => Ok(record.into_value()),
            _ => Err(StoreError::not_found(key)),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        check_record_size(key, value, self.max_record_size).map_err(|e| self.reject(e))?;
        self.append(&Record::new_value(key, value))
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        // An oversized tombstone would trip the frame ceiling on every later scan
        check_record_size(key, &[], self.max_record_size).map_err(|e| self.reject(e))?;
        self.append(&Record::new_tombstone(key))
    }

    fn close(&self) -> StoreResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.sink.event(
                Event::StoreClosed,
                &[("path", self.path().display().to_string().as_str())],
            );
        }
        Ok(())
    }
}
