//! Storage error types
//!
//! Error codes:
//! - KALLBAZ_INSUFFICIENT_DATA: a frame declares more bytes than are available
//! - KALLBAZ_CORRUPT_DATA: checksum mismatch or an impossible frame
//! - KALLBAZ_IO_ERROR: the log file could not be opened, read or written

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for codec, scanner and writer operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while encoding, decoding, scanning or appending frames.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The frame declares more bytes than the input holds.
    ///
    /// On a fully written log this only happens after a torn tail write.
    #[error("insufficient data: frame needs {needed} bytes, {available} available")]
    InsufficientData { needed: u64, available: u64 },

    #[error("the record has been corrupted: stored checksum {stored:08x}, computed {computed:08x}")]
    CorruptData { stored: u32, computed: u32 },

    #[error("the record has been corrupted: unknown record kind {0}")]
    UnknownKind(u8),

    /// Declared key + value length exceeds the scanner ceiling.
    #[error("frame payload of {size} bytes exceeds max record size {max}")]
    FrameTooLarge { size: u64, max: u64 },

    #[error("could not open log file {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not read from log: {source}")]
    Read {
        #[source]
        source: io::Error,
    },

    #[error("could not write record to log file {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::InsufficientData { .. } => "KALLBAZ_INSUFFICIENT_DATA",
            StorageError::CorruptData { .. }
            | StorageError::UnknownKind(_)
            | StorageError::FrameTooLarge { .. } => "KALLBAZ_CORRUPT_DATA",
            StorageError::Open { .. } | StorageError::Read { .. } | StorageError::Write { .. } => {
                "KALLBAZ_IO_ERROR"
            }
        }
    }

    /// Returns whether the error describes bytes that cannot be a valid frame.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StorageError::CorruptData { .. }
                | StorageError::UnknownKind(_)
                | StorageError::FrameTooLarge { .. }
        )
    }

    /// Returns whether the error came from the underlying file system.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            StorageError::Open { .. } | StorageError::Read { .. } | StorageError::Write { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_codes() {
        let insufficient = StorageError::InsufficientData {
            needed: 20,
            available: 3,
        };
        assert_eq!(insufficient.code(), "KALLBAZ_INSUFFICIENT_DATA");
        assert!(!insufficient.is_corruption());

        let corrupt = StorageError::CorruptData {
            stored: 1,
            computed: 2,
        };
        assert_eq!(corrupt.code(), "KALLBAZ_CORRUPT_DATA");
        assert!(corrupt.is_corruption());
        assert!(StorageError::UnknownKind(9).is_corruption());
    }

    #[test]
    fn test_io_errors_keep_source() {
        let err = StorageError::Write {
            path: PathBuf::from("/tmp/store.db"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert!(err.is_io());
        assert_eq!(err.code(), "KALLBAZ_IO_ERROR");
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/store.db"));
    }

    #[test]
    fn test_display_contains_checksums() {
        let err = StorageError::CorruptData {
            stored: 0xdeadbeef,
            computed: 0x0000_0001,
        };
        let display = err.to_string();
        assert!(display.contains("deadbeef"));
        assert!(display.contains("00000001"));
    }
}
