//! Append-only record log
//!
//! The log is a flat file of self-describing frames, one per record.
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates, no truncation)
//! - Checksum-verified on every read
//! - Tombstones preserved forever (no compaction)
//! - Latest record wins for the same key
//! - First truncated or corrupt frame halts a scan

mod checksum;
mod errors;
mod reader;
mod record;
mod writer;

pub use checksum::compute_checksum;
pub use errors::{StorageError, StorageResult};
pub use reader::LogScanner;
pub use record::{FrameHeader, Record, RecordKind, HEADER_LEN};
pub use writer::LogWriter;
