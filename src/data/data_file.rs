use std::{
  io,
  path::{Path, PathBuf},
};

use crate::{
  errors::{Errors, Result},
  fio::{file_io::FileIO, new_io_manager, IOManager},
  option::IOManagerType,
};

use super::log_record::{
  decode_record_header, LogRecord, CRC_SIZE, LOG_RECORD_HEADER_SIZE, MAX_KEY_SIZE, MAX_VALUE_SIZE,
};

pub const DATA_FILE_NAME_SUFFIX: &str = ".log";

/// Builds the path of a data file: the 16-digit zero-padded file id plus
/// the `.log` suffix, e.g. `0000000000000001.log`.
pub fn get_data_file_name<P>(dir_path: P, file_id: u64) -> PathBuf
where
  P: AsRef<Path>,
{
  let name = format!("{:016}{}", file_id, DATA_FILE_NAME_SUFFIX);
  dir_path.as_ref().join(name)
}

pub struct ReadLogRecord {
  pub record: LogRecord,
  pub size: u64,
}

/// A single append-only data file.
///
/// The file with the highest id in a data directory is the active one and
/// the only one appended to; every older file is immutable and only read
/// positionally.
pub struct DataFile {
  file_id: u64,
  write_off: u64,
  io_manager: Box<dyn IOManager>,
}

impl DataFile {
  /// Opens (creating if needed) the data file for `file_id` under
  /// `dir_path`. The tracked append position starts at the current file
  /// size.
  pub fn new<P>(dir_path: P, file_id: u64, io_type: IOManagerType) -> Result<DataFile>
  where
    P: AsRef<Path>,
  {
    let file_name = get_data_file_name(dir_path, file_id);
    let io_manager = new_io_manager(&file_name, &io_type)?;
    let write_off = io_manager.size();
    Ok(DataFile {
      file_id,
      write_off,
      io_manager,
    })
  }

  /// Opens the existing data file for `file_id` with read-only
  /// permission. This is the open path for every file other than the
  /// engine's own active one: positional reads of older files and the
  /// startup scan. Fails if the file does not exist.
  pub fn open_read_only<P>(dir_path: P, file_id: u64) -> Result<DataFile>
  where
    P: AsRef<Path>,
  {
    let file_name = get_data_file_name(dir_path, file_id);
    let io_manager: Box<dyn IOManager> = Box::new(FileIO::open_read_only(&file_name)?);
    let write_off = io_manager.size();
    Ok(DataFile {
      file_id,
      write_off,
      io_manager,
    })
  }

  pub fn file_id(&self) -> u64 {
    self.file_id
  }

  pub fn write_off(&self) -> u64 {
    self.write_off
  }

  /// Appends an encoded record in a single write call and returns the
  /// offset the record starts at.
  ///
  /// On a failed or partial write the tracked position is re-read from the
  /// file so it matches whatever actually landed on disk; the record
  /// counts as not written.
  pub fn append(&mut self, buf: &[u8]) -> Result<u64> {
    let record_start = self.write_off;
    match self.io_manager.write(buf) {
      Ok(n) if n == buf.len() => {
        self.write_off += n as u64;
        Ok(record_start)
      }
      Ok(n) => {
        self.write_off = self.io_manager.size();
        Err(Errors::FailedToWriteDataFile(io::Error::new(
          io::ErrorKind::WriteZero,
          format!("partial append of {} out of {} bytes", n, buf.len()),
        )))
      }
      Err(e) => {
        self.write_off = self.io_manager.size();
        Err(e)
      }
    }
  }

  /// Decodes the record starting at `offset`.
  ///
  /// Fewer than 28 header bytes left in the file is a clean end of file.
  /// A header declaring out-of-bounds sizes, a short read inside the
  /// key/value payload, and a checksum mismatch are each reported as
  /// distinct corruption errors.
  pub fn read_log_record(&self, offset: u64) -> Result<ReadLogRecord> {
    let mut header_buf = [0u8; LOG_RECORD_HEADER_SIZE];
    let n = match self.io_manager.read(&mut header_buf, offset) {
      Ok(n) => n,
      Err(Errors::ReadDataFileEOF) => return Err(Errors::ReadDataFileEOF),
      Err(e) => return Err(e),
    };
    if n < LOG_RECORD_HEADER_SIZE {
      return Err(Errors::ReadDataFileEOF);
    }

    let header = decode_record_header(&header_buf);
    if !(0..=MAX_KEY_SIZE).contains(&header.key_size)
      || !(0..=MAX_VALUE_SIZE).contains(&header.value_size)
    {
      return Err(Errors::InvalidRecordSize);
    }

    let key_size = header.key_size as usize;
    let value_size = header.value_size as usize;
    let mut body = vec![0u8; key_size + value_size];
    let read = match self
      .io_manager
      .read(&mut body, offset + LOG_RECORD_HEADER_SIZE as u64)
    {
      Ok(n) => n,
      Err(Errors::ReadDataFileEOF) => return Err(Errors::TruncatedRecord),
      Err(e) => return Err(e),
    };
    if read < body.len() {
      return Err(Errors::TruncatedRecord);
    }

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&header_buf[CRC_SIZE..]);
    hasher.update(&body);
    if hasher.finalize() != header.crc {
      return Err(Errors::InvalidRecordCrc);
    }

    let value = body.split_off(key_size);
    Ok(ReadLogRecord {
      record: LogRecord::from_parts(header.timestamp, body, value),
      size: (LOG_RECORD_HEADER_SIZE + key_size + value_size) as u64,
    })
  }

  /// Positional read of exactly `size` bytes at `offset`; a short read is
  /// an error.
  pub fn read_value(&self, offset: u64, size: u64) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; size as usize];
    let n = self.io_manager.read(&mut buf, offset)?;
    if n < buf.len() {
      return Err(Errors::FailedToReadDataFile(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "short read of value payload",
      )));
    }
    Ok(buf)
  }

  pub fn sync(&self) -> Result<()> {
    self.io_manager.sync()
  }
}
