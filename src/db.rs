use std::{
  fs::{self, File, OpenOptions},
  path::Path,
  sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use bytes::Bytes;
use fs2::FileExt;
use log::{error, warn};
use parking_lot::RwLock;

use crate::{
  data::{
    data_file::{DataFile, DATA_FILE_NAME_SUFFIX},
    log_record::{LogRecord, LogRecordPos, LOG_RECORD_HEADER_SIZE, TOMBSTONE},
  },
  errors::{Errors, Result},
  index::{new_indexer, Indexer},
  option::{IOManagerType, Options},
  util,
};

pub(crate) const FILE_LOCK_NAME: &str = "bitcask.lock";

/// A point-in-time summary of the engine.
#[derive(Debug, Clone, Copy)]
pub struct Stat {
  /// Number of live keys in the key directory.
  pub key_num: usize,
  /// Total bytes occupied by the data directory on disk.
  pub disk_size: u64,
}

/// The on-disk storage engine.
///
/// One engine owns one data directory: a set of append-only data files of
/// which only the highest-numbered one receives writes, an in-memory key
/// directory rebuilt from those files at open, and an advisory lock file
/// that keeps other processes out.
///
/// The reader/writer lock around the active file is the engine's single
/// intra-process lock: reads take the shared side, while `put`, `delete`
/// and `close` take the exclusive side and also perform their key
/// directory mutation under it. Combined with the inter-process lock this
/// guarantees a single writer per data directory.
pub struct Engine {
  pub(crate) options: Options,
  pub(crate) active_file: RwLock<DataFile>,
  pub(crate) index: Box<dyn Indexer>,
  lock_file: File,
  bytes_write: AtomicUsize,
  closed: AtomicBool,
}

impl Engine {
  /// Opens the engine on `options.dir_path`, creating the directory if
  /// needed.
  ///
  /// Startup rebuilds the key directory by scanning every `<digits>.log`
  /// file in ascending id order, then opens a fresh active file numbered
  /// one above the highest id seen. Fails with `DatabaseIsUsing` when
  /// another live engine holds the directory.
  pub fn open(options: Options) -> Result<Self> {
    let dir_path = options.dir_path.clone();
    if let Err(e) = fs::create_dir_all(&dir_path) {
      error!("failed to create database directory: {}", e);
      return Err(Errors::FailedToCreateDatabaseDir(e));
    }

    let lock_file = OpenOptions::new()
      .create(true)
      .read(true)
      .write(true)
      .open(dir_path.join(FILE_LOCK_NAME))?;
    if let Err(e) = lock_file.try_lock_exclusive() {
      if e.kind() == fs2::lock_contended_error().kind() {
        return Err(Errors::DatabaseIsUsing);
      }
      return Err(Errors::Io(e));
    }

    let scan_io_type = if options.mmap_at_startup {
      IOManagerType::MemoryMap
    } else {
      IOManagerType::StandardFileIO
    };
    let (data_files, highest_file_id) = load_data_files(&dir_path, scan_io_type)?;

    let index = new_indexer(&options.index_type);
    load_index_from_data_files(index.as_ref(), &data_files)?;
    drop(data_files);

    let active_file = match DataFile::new(
      &dir_path,
      highest_file_id + 1,
      IOManagerType::StandardFileIO,
    ) {
      Ok(file) => file,
      Err(e) => {
        if let Err(unlock_err) = lock_file.unlock() {
          error!("failed to release the directory lock: {}", unlock_err);
        }
        return Err(e);
      }
    };

    Ok(Self {
      options,
      active_file: RwLock::new(active_file),
      index,
      lock_file,
      bytes_write: AtomicUsize::new(0),
      closed: AtomicBool::new(false),
    })
  }

  /// Stores `value` under `key`, overwriting any previous value.
  ///
  /// Empty keys are rejected; empty values are fine. The key directory is
  /// only updated once the record has landed in the active file, so a
  /// failed append leaves the previous value visible.
  pub fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
    if key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }

    let mut active_file = self.active_file.write();
    self.check_open()?;

    // stamped under the writer lock so timestamp order matches append
    // order and recovery replays the same winner
    let record = LogRecord::new(key.to_vec(), value.to_vec());
    let enc = record.encode();
    let record_start = active_file.append(&enc)?;
    self.maybe_sync(&active_file, enc.len())?;

    let pos = LogRecordPos {
      file_id: active_file.file_id(),
      offset: record_start + LOG_RECORD_HEADER_SIZE as u64 + key.len() as u64,
      size: value.len() as u64,
      timestamp: record.timestamp,
    };
    self.index.put(key.to_vec(), pos);
    Ok(())
  }

  /// Fetches the current value of `key`.
  pub fn get(&self, key: Bytes) -> Result<Bytes> {
    let active_file = self.active_file.read();
    self.check_open()?;

    let pos = match self.index.get(key.to_vec()) {
      Some(pos) => pos,
      None => return Err(Errors::KeyNotFound),
    };

    let value = if pos.file_id == active_file.file_id() {
      active_file.read_value(pos.offset, pos.size)?
    } else {
      // older files are immutable and opened read-only; a short-lived
      // handle per read keeps no descriptors open for cold files
      let data_file = DataFile::open_read_only(&self.options.dir_path, pos.file_id)?;
      data_file.read_value(pos.offset, pos.size)?
    };

    if value == TOMBSTONE {
      return Err(Errors::KeyNotFound);
    }
    Ok(Bytes::from(value))
  }

  /// Removes `key`. Deleting a key that does not exist is a successful
  /// no-op and writes nothing.
  pub fn delete(&self, key: Bytes) -> Result<()> {
    let mut active_file = self.active_file.write();
    self.check_open()?;

    if self.index.get(key.to_vec()).is_none() {
      return Ok(());
    }

    let record = LogRecord::tombstone(key.to_vec());
    let enc = record.encode();
    active_file.append(&enc)?;
    self.maybe_sync(&active_file, enc.len())?;

    self.index.delete(key.to_vec());
    Ok(())
  }

  /// Flushes the active file to disk.
  pub fn sync(&self) -> Result<()> {
    let active_file = self.active_file.read();
    self.check_open()?;
    active_file.sync()
  }

  pub fn stat(&self) -> Result<Stat> {
    let _active_file = self.active_file.read();
    self.check_open()?;
    Ok(Stat {
      key_num: self.index.len(),
      disk_size: util::file::dir_disk_size(&self.options.dir_path),
    })
  }

  /// Shuts the engine down: syncs the active file and releases the
  /// inter-process lock. Both steps are attempted even if the first
  /// fails; the first error wins and a secondary failure is logged.
  /// Calling `close` again is a no-op; any other operation afterwards
  /// fails with `DatabaseClosed`.
  pub fn close(&self) -> Result<()> {
    let active_file = self.active_file.write();
    if self.closed.swap(true, Ordering::SeqCst) {
      return Ok(());
    }

    let sync_res = active_file.sync();
    let unlock_res = self.lock_file.unlock();

    if let Err(e) = sync_res {
      if let Err(unlock_err) = unlock_res {
        error!("failed to release the directory lock: {}", unlock_err);
      }
      return Err(e);
    }
    unlock_res.map_err(Errors::FailedToUnlockDatabaseDir)
  }

  fn check_open(&self) -> Result<()> {
    if self.closed.load(Ordering::SeqCst) {
      return Err(Errors::DatabaseClosed);
    }
    Ok(())
  }

  fn maybe_sync(&self, active_file: &DataFile, just_written: usize) -> Result<()> {
    let written = self.bytes_write.fetch_add(just_written, Ordering::SeqCst) + just_written;
    let threshold_reached =
      self.options.bytes_per_sync > 0 && written >= self.options.bytes_per_sync;
    if self.options.sync_writes || threshold_reached {
      active_file.sync()?;
      self.bytes_write.store(0, Ordering::SeqCst);
    }
    Ok(())
  }
}

impl Drop for Engine {
  fn drop(&mut self) {
    if let Err(e) = self.close() {
      error!("failed to close engine: {}", e);
    }
  }
}

/// Lists the data files in `dir_path`, ignoring sub-directories and any
/// entry whose name is not `<digits>.log` (this skips the lock file and
/// stray artifacts). Returns the files sorted by ascending id together
/// with the highest id seen from the names, which counts toward
/// active-file selection even if that file turns out to be unreadable.
fn load_data_files<P>(dir_path: P, io_type: IOManagerType) -> Result<(Vec<DataFile>, u64)>
where
  P: AsRef<Path>,
{
  let dir = match fs::read_dir(&dir_path) {
    Ok(dir) => dir,
    Err(e) => {
      error!("failed to read database directory: {}", e);
      return Err(Errors::FailedToReadDatabaseDir(e));
    }
  };

  let mut file_ids = Vec::new();
  let mut highest_file_id = 0u64;
  for entry in dir.flatten() {
    if entry.path().is_dir() {
      continue;
    }
    let file_name_os = entry.file_name();
    let file_name = match file_name_os.to_str() {
      Some(name) => name,
      None => continue,
    };
    let stem = match file_name.strip_suffix(DATA_FILE_NAME_SUFFIX) {
      Some(stem) => stem,
      None => continue,
    };
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
      continue;
    }
    let file_id = match stem.parse::<u64>() {
      Ok(id) => id,
      Err(_) => continue,
    };
    highest_file_id = highest_file_id.max(file_id);
    file_ids.push(file_id);
  }
  file_ids.sort_unstable();

  // scan handles are read-only; only the engine's active file ever gets
  // an append-capable open
  let mut data_files = Vec::with_capacity(file_ids.len());
  for file_id in file_ids {
    let data_file = match io_type {
      IOManagerType::MemoryMap => DataFile::new(&dir_path, file_id, io_type)?,
      IOManagerType::StandardFileIO => DataFile::open_read_only(&dir_path, file_id)?,
    };
    data_files.push(data_file);
  }
  Ok((data_files, highest_file_id))
}

/// Replays every data file into the key directory.
///
/// Tombstones remove their key; any other record wins the slot iff it is
/// at least as recent as the entry already there, so on equal timestamps
/// the record seen later in scan order prevails. A corrupt record stops
/// the scan of its file but not of the remaining files, which keeps
/// everything before a torn tail readable.
fn load_index_from_data_files(index: &dyn Indexer, data_files: &[DataFile]) -> Result<()> {
  for data_file in data_files {
    let mut offset = 0u64;
    loop {
      let read_record = match data_file.read_log_record(offset) {
        Ok(read_record) => read_record,
        Err(Errors::ReadDataFileEOF) => break,
        Err(e @ (Errors::InvalidRecordSize | Errors::TruncatedRecord | Errors::InvalidRecordCrc)) => {
          warn!(
            "stopping scan of data file {} at offset {}: {}",
            data_file.file_id(),
            offset,
            e
          );
          break;
        }
        Err(e) => return Err(e),
      };

      let record = read_record.record;
      if record.is_tombstone() {
        index.delete(record.key);
      } else {
        let pos = LogRecordPos {
          file_id: data_file.file_id(),
          offset: offset + LOG_RECORD_HEADER_SIZE as u64 + record.key.len() as u64,
          size: record.value.len() as u64,
          timestamp: record.timestamp,
        };
        match index.get(record.key.clone()) {
          Some(existing) if record.timestamp < existing.timestamp => {}
          _ => {
            index.put(record.key, pos);
          }
        }
      }
      offset += read_record.size;
    }
  }
  Ok(())
}
