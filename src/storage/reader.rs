//! Forward-only log scanner
//!
//! Reads frames one at a time from any byte stream. Every frame is
//! checksum-verified on read. The scanner never resynchronizes: the first
//! truncated or corrupt frame ends the scan and becomes its terminal error.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::errors::{StorageError, StorageResult};
use super::record::{FrameHeader, Record, HEADER_LEN};

/// Lazy, single-pass sequence of records read from a stream.
///
/// Iteration ends on clean end-of-stream or on the first error. Errors are
/// not returned mid-iteration; inspect [`LogScanner::error`] or call
/// [`LogScanner::finish`] once the scan is over.
pub struct LogScanner<R> {
    reader: R,
    /// Ceiling on key + value bytes buffered for one frame
    max_record_size: u64,
    /// Byte offset of the next frame
    offset: u64,
    /// Records yielded so far
    records_read: u64,
    done: bool,
    error: Option<StorageError>,
}

impl LogScanner<BufReader<File>> {
    /// Opens the log file at `path` for scanning.
    pub fn open(path: &Path, max_record_size: usize) -> StorageResult<Self> {
        let file = File::open(path).map_err(|e| StorageError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(BufReader::new(file), max_record_size))
    }
}

impl<R: Read> LogScanner<R> {
    /// Creates a scanner over `reader`.
    pub fn new(reader: R, max_record_size: usize) -> Self {
        Self {
            reader,
            max_record_size: max_record_size as u64,
            offset: 0,
            records_read: 0,
            done: false,
            error: None,
        }
    }

    /// Returns the byte offset of the next frame.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the number of records yielded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Returns the terminal error, if the scan stopped on one.
    pub fn error(&self) -> Option<&StorageError> {
        self.error.as_ref()
    }

    /// Consumes the scanner, returning its terminal error if any.
    pub fn finish(self) -> StorageResult<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Reads the next record.
    ///
    /// # Returns
    ///
    /// - `Some(record)` if a complete, valid frame was read
    /// - `None` at end of stream or once a terminal error has been recorded
    pub fn advance(&mut self) -> Option<Record> {
        if self.done {
            return None;
        }

        match self.read_frame() {
            Ok(Some((record, frame_len))) => {
                self.offset += frame_len;
                self.records_read += 1;
                Some(record)
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                self.error = Some(err);
                None
            }
        }
    }

    fn read_frame(&mut self) -> StorageResult<Option<(Record, u64)>> {
        let mut header = [0u8; HEADER_LEN];
        let header_read = read_full(&mut self.reader, &mut header)?;

        if header_read == 0 {
            return Ok(None);
        }
        if header_read < HEADER_LEN {
            return Err(StorageError::InsufficientData {
                needed: HEADER_LEN as u64,
                available: header_read as u64,
            });
        }

        let parsed = FrameHeader::parse(&header);
        let payload_len = parsed.payload_len();
        if payload_len > self.max_record_size {
            return Err(StorageError::FrameTooLarge {
                size: payload_len,
                max: self.max_record_size,
            });
        }

        let frame_len = parsed.frame_len();
        let mut frame = vec![0u8; frame_len as usize];
        frame[..HEADER_LEN].copy_from_slice(&header);

        let body_read = read_full(&mut self.reader, &mut frame[HEADER_LEN..])?;
        if body_read < payload_len as usize {
            return Err(StorageError::InsufficientData {
                needed: frame_len,
                available: (HEADER_LEN + body_read) as u64,
            });
        }

        let record = Record::decode(&frame)?;
        Ok(Some((record, frame_len)))
    }
}

impl<R: Read> Iterator for LogScanner<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.advance()
    }
}

/// Fills `buf` from `reader` until it is full or the stream ends.
///
/// Returns the number of bytes read; less than `buf.len()` only at end of stream.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> StorageResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StorageError::Read { source: e }),
        }
    }
    Ok(filled)
}
