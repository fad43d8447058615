use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Fixed record header: crc (4) + timestamp (8) + key_size (8) + value_size (8).
pub const LOG_RECORD_HEADER_SIZE: usize = 28;

pub(crate) const CRC_SIZE: usize = 4;

/// Per-field sanity bound applied at decode time. A header that declares a
/// key or value larger than this is treated as corrupt rather than allowed
/// to drive a huge allocation.
pub const MAX_KEY_SIZE: i64 = 1 << 20;
pub const MAX_VALUE_SIZE: i64 = 1 << 20;

/// Sentinel value marking a key as deleted. A record carrying this exact
/// value is a tombstone; the startup scan and reads interpret it as
/// "key absent".
pub(crate) const TOMBSTONE: &[u8] = b"<DELETED>";

/// A single record in a data file: header, key bytes, value bytes.
///
/// The on-disk layout is big-endian throughout with no padding:
///
/// ```text
/// | crc: u32 | timestamp: i64 | key_size: i64 | value_size: i64 | key | value |
/// ```
///
/// The crc is CRC-32 (IEEE) over everything after the crc field itself,
/// so a flipped bit in the key is caught as well as one in the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
  pub(crate) timestamp: i64,
  pub(crate) key: Vec<u8>,
  pub(crate) value: Vec<u8>,
}

impl LogRecord {
  /// Builds a record for `key`/`value` stamped with the current time in
  /// nanoseconds since the Unix epoch.
  pub fn new(key: Vec<u8>, value: Vec<u8>) -> Self {
    Self {
      timestamp: timestamp_nanos(),
      key,
      value,
    }
  }

  /// Builds a deletion marker for `key`.
  pub fn tombstone(key: Vec<u8>) -> Self {
    Self {
      timestamp: timestamp_nanos(),
      key,
      value: TOMBSTONE.to_vec(),
    }
  }

  pub(crate) fn from_parts(timestamp: i64, key: Vec<u8>, value: Vec<u8>) -> Self {
    Self {
      timestamp,
      key,
      value,
    }
  }

  pub fn is_tombstone(&self) -> bool {
    self.value == TOMBSTONE
  }

  pub fn encoded_len(&self) -> usize {
    LOG_RECORD_HEADER_SIZE + self.key.len() + self.value.len()
  }

  /// Serializes the record into its on-disk form.
  pub fn encode(&self) -> Bytes {
    let mut buf = BytesMut::with_capacity(self.encoded_len());
    buf.put_u32(0); // crc, filled in below
    buf.put_i64(self.timestamp);
    buf.put_i64(self.key.len() as i64);
    buf.put_i64(self.value.len() as i64);
    buf.extend_from_slice(&self.key);
    buf.extend_from_slice(&self.value);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&buf[CRC_SIZE..]);
    let crc = hasher.finalize();
    buf[..CRC_SIZE].copy_from_slice(&crc.to_be_bytes());

    buf.freeze()
  }
}

/// In-memory position of a record's value payload, held by the key
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecordPos {
  pub(crate) file_id: u64,
  pub(crate) offset: u64,
  pub(crate) size: u64,
  pub(crate) timestamp: i64,
}

pub(crate) struct LogRecordHeader {
  pub(crate) crc: u32,
  pub(crate) timestamp: i64,
  pub(crate) key_size: i64,
  pub(crate) value_size: i64,
}

pub(crate) fn decode_record_header(mut buf: &[u8]) -> LogRecordHeader {
  LogRecordHeader {
    crc: buf.get_u32(),
    timestamp: buf.get_i64(),
    key_size: buf.get_i64(),
    value_size: buf.get_i64(),
  }
}

fn timestamp_nanos() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_nanos() as i64)
    .unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_encode_layout() {
    let record = LogRecord {
      timestamp: 42,
      key: b"foo".to_vec(),
      value: b"bar".to_vec(),
    };
    let enc = record.encode();
    assert_eq!(enc.len(), LOG_RECORD_HEADER_SIZE + 6);

    let header = decode_record_header(&enc[..LOG_RECORD_HEADER_SIZE]);
    assert_eq!(header.timestamp, 42);
    assert_eq!(header.key_size, 3);
    assert_eq!(header.value_size, 3);
    assert_eq!(&enc[LOG_RECORD_HEADER_SIZE..LOG_RECORD_HEADER_SIZE + 3], b"foo");
    assert_eq!(&enc[LOG_RECORD_HEADER_SIZE + 3..], &b"bar"[..]);

    // big-endian header fields
    assert_eq!(&enc[4..12], 42i64.to_be_bytes().as_slice());

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&enc[CRC_SIZE..]);
    assert_eq!(header.crc, hasher.finalize());
  }

  #[test]
  fn test_encode_empty_value() {
    let record = LogRecord::new(b"k".to_vec(), Vec::new());
    let enc = record.encode();
    assert_eq!(enc.len(), LOG_RECORD_HEADER_SIZE + 1);

    let header = decode_record_header(&enc[..LOG_RECORD_HEADER_SIZE]);
    assert_eq!(header.key_size, 1);
    assert_eq!(header.value_size, 0);
  }

  #[test]
  fn test_tombstone() {
    let record = LogRecord::tombstone(b"foo".to_vec());
    assert!(record.is_tombstone());
    assert_eq!(record.value, b"<DELETED>");

    let normal = LogRecord::new(b"foo".to_vec(), b"bar".to_vec());
    assert!(!normal.is_tombstone());
  }

  #[test]
  fn test_timestamps_are_fresh() {
    let a = LogRecord::new(b"k".to_vec(), b"v".to_vec());
    assert!(a.timestamp > 0);
  }
}
