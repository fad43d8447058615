use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Errors>;

/// Errors surfaced by the storage engines.
#[derive(Debug, Error)]
pub enum Errors {
  #[error("the key is empty")]
  KeyIsEmpty,

  #[error("key is not found in database")]
  KeyNotFound,

  #[error("the database directory is used by another process")]
  DatabaseIsUsing,

  #[error("the database has been closed")]
  DatabaseClosed,

  #[error("failed to create the database directory")]
  FailedToCreateDatabaseDir(#[source] io::Error),

  #[error("failed to read the database directory")]
  FailedToReadDatabaseDir(#[source] io::Error),

  #[error("failed to open data file")]
  FailedToOpenDataFile(#[source] io::Error),

  #[error("failed to read from data file")]
  FailedToReadDataFile(#[source] io::Error),

  #[error("failed to append to data file")]
  FailedToWriteDataFile(#[source] io::Error),

  #[error("failed to sync data file")]
  FailedToSyncDataFile(#[source] io::Error),

  #[error("failed to release the database directory lock")]
  FailedToUnlockDatabaseDir(#[source] io::Error),

  /// Clean end of a data file; the scan loop moves on to the next file.
  #[error("read data file EOF")]
  ReadDataFileEOF,

  #[error("record header declares an out-of-bounds key or value size")]
  InvalidRecordSize,

  #[error("record is truncated")]
  TruncatedRecord,

  #[error("record checksum mismatch")]
  InvalidRecordCrc,

  #[error("io error")]
  Io(#[from] io::Error),
}
