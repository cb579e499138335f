//! Log record types and their on-disk frame format
//!
//! Every record is written as one self-describing frame (big-endian):
//!
//! ```text
//! +------------------+
//! | Checksum         | (u32 BE)
//! +------------------+
//! | Kind             | (u8: 0 = value, 1 = tombstone)
//! +------------------+
//! | Key Length       | (u32 BE)
//! +------------------+
//! | Value Length     | (u32 BE)
//! +------------------+
//! | Key              | (Key Length bytes)
//! +------------------+
//! | Value            | (Value Length bytes, empty for tombstones)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::{self, Write};

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StorageError, StorageResult};

/// Size of the checksum field
pub const CHECKSUM_LEN: usize = 4;
/// Size of the fixed frame header (checksum + kind + key length + value length)
pub const HEADER_LEN: usize = CHECKSUM_LEN + 1 + 4 + 4;

/// Record kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordKind {
    /// A live key/value pair
    Value = 0,
    /// Logical deletion marker
    Tombstone = 1,
}

impl RecordKind {
    /// Decode a kind byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(RecordKind::Value),
            1 => Some(RecordKind::Tombstone),
            _ => None,
        }
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Value => "VALUE",
            RecordKind::Tombstone => "TOMBSTONE",
        }
    }
}

/// Fixed-size frame header, parsed before the body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Stored checksum
    pub checksum: u32,
    /// Raw kind byte (not yet validated)
    pub kind: u8,
    /// Declared key length
    pub key_len: u32,
    /// Declared value length
    pub value_len: u32,
}

impl FrameHeader {
    /// Parse the header from the first `HEADER_LEN` bytes of a frame.
    pub fn parse(header: &[u8; HEADER_LEN]) -> Self {
        Self {
            checksum: u32::from_be_bytes([header[0], header[1], header[2], header[3]]),
            kind: header[4],
            key_len: u32::from_be_bytes([header[5], header[6], header[7], header[8]]),
            value_len: u32::from_be_bytes([header[9], header[10], header[11], header[12]]),
        }
    }

    /// Declared key + value length.
    pub fn payload_len(&self) -> u64 {
        self.key_len as u64 + self.value_len as u64
    }

    /// Declared total frame length including the header.
    pub fn frame_len(&self) -> u64 {
        HEADER_LEN as u64 + self.payload_len()
    }
}

/// One entry of the append-only log.
///
/// Records are never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    key: Vec<u8>,
    value: Vec<u8>,
}

impl Record {
    /// Create a value record
    pub fn new_value(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: RecordKind::Value,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a tombstone record for a deleted key
    pub fn new_tombstone(key: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: RecordKind::Tombstone,
            key: key.into(),
            value: Vec::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Consume the record, returning its value bytes.
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    pub fn is_tombstone(&self) -> bool {
        self.kind == RecordKind::Tombstone
    }

    /// Exact serialized length; always equals `self.encode().len()`.
    pub fn size(&self) -> usize {
        HEADER_LEN + self.key.len() + self.value.len()
    }

    /// Serialize the record into a single frame.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size());

        // Checksum placeholder, filled in once the rest is written
        buf.extend_from_slice(&[0u8; CHECKSUM_LEN]);
        buf.push(self.kind as u8);
        buf.extend_from_slice(&(self.key.len() as u32).to_be_bytes());
        buf.extend_from_slice(&(self.value.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);

        let checksum = compute_checksum(&buf[CHECKSUM_LEN..]);
        buf[..CHECKSUM_LEN].copy_from_slice(&checksum.to_be_bytes());

        buf
    }

    /// Write the encoded frame to `writer` in a single `write_all`.
    ///
    /// Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let frame = self.encode();
        writer.write_all(&frame)?;
        Ok(frame.len())
    }

    /// Deserialize the frame at the start of `data`, verifying its checksum.
    ///
    /// Bytes after the first frame are ignored.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` if `data` is shorter than the header or the
    ///   lengths the header declares
    /// - `CorruptData` if the checksum does not match
    /// - `UnknownKind` if the checksum matches but the kind byte is invalid
    pub fn decode(data: &[u8]) -> StorageResult<Self> {
        let available = data.len() as u64;

        let header: &[u8; HEADER_LEN] = data
            .get(..HEADER_LEN)
            .and_then(|bytes| <&[u8; HEADER_LEN]>::try_from(bytes).ok())
            .ok_or(StorageError::InsufficientData {
                needed: HEADER_LEN as u64,
                available,
            })?;
        let header = FrameHeader::parse(header);

        // Compared in u64 so a hostile length can never overflow or index out of range
        let frame_len = header.frame_len();
        if available < frame_len {
            return Err(StorageError::InsufficientData {
                needed: frame_len,
                available,
            });
        }
        let frame_len = frame_len as usize;

        let checked = &data[CHECKSUM_LEN..frame_len];
        if !verify_checksum(checked, header.checksum) {
            return Err(StorageError::CorruptData {
                stored: header.checksum,
                computed: compute_checksum(checked),
            });
        }

        let kind = RecordKind::from_u8(header.kind).ok_or(StorageError::UnknownKind(header.kind))?;

        let key_end = HEADER_LEN + header.key_len as usize;
        Ok(Self {
            kind,
            key: data[HEADER_LEN..key_end].to_vec(),
            value: data[key_end..frame_len].to_vec(),
        })
    }
}
