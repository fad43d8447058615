use std::{
  fs::{File, OpenOptions},
  io::Write,
  path::Path,
  sync::Arc,
};

use log::error;
use parking_lot::RwLock;

use crate::errors::{Errors, Result};

use super::IOManager;

/// Standard file I/O backed by `std::fs::File`.
///
/// The file is opened with append-on-write semantics, so every `write`
/// lands at the current end of file regardless of reads happening in
/// between. Reads are positional and do not move the write cursor.
pub struct FileIO {
  fd: Arc<RwLock<File>>,
}

impl FileIO {
  pub fn new<P>(filename: P) -> Result<Self>
  where
    P: AsRef<Path>,
  {
    match OpenOptions::new()
      .create(true)
      .read(true)
      .append(true)
      .open(filename)
    {
      Ok(file) => Ok(FileIO {
        fd: Arc::new(RwLock::new(file)),
      }),
      Err(e) => {
        error!("failed to open data file: {}", e);
        Err(Errors::FailedToOpenDataFile(e))
      }
    }
  }

  /// Opens an existing file with read-only permission. Data files older
  /// than the active one are immutable, so their handles never get write
  /// capability; the file is not created if it is missing.
  pub fn open_read_only<P>(filename: P) -> Result<Self>
  where
    P: AsRef<Path>,
  {
    match OpenOptions::new().read(true).open(filename) {
      Ok(file) => Ok(FileIO {
        fd: Arc::new(RwLock::new(file)),
      }),
      Err(e) => {
        error!("failed to open data file: {}", e);
        Err(Errors::FailedToOpenDataFile(e))
      }
    }
  }
}

impl IOManager for FileIO {
  fn read(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
    let read_guard = self.fd.read();
    #[cfg(target_family = "unix")]
    {
      use std::os::unix::fs::FileExt;
      match read_guard.read_at(buf, offset) {
        Ok(n) => Ok(n),
        Err(e) => {
          error!("failed to read from data file: {}", e);
          Err(Errors::FailedToReadDataFile(e))
        }
      }
    }
    #[cfg(target_family = "windows")]
    {
      use std::os::windows::fs::FileExt;
      match read_guard.seek_read(buf, offset) {
        Ok(n) => Ok(n),
        Err(e) => {
          error!("failed to read from data file: {}", e);
          Err(Errors::FailedToReadDataFile(e))
        }
      }
    }
  }

  fn write(&self, buf: &[u8]) -> Result<usize> {
    let mut write_guard = self.fd.write();
    match write_guard.write(buf) {
      Ok(n) => Ok(n),
      Err(e) => {
        error!("failed to append to data file: {}", e);
        Err(Errors::FailedToWriteDataFile(e))
      }
    }
  }

  fn sync(&self) -> Result<()> {
    let read_guard = self.fd.read();
    if let Err(e) = read_guard.sync_all() {
      error!("failed to sync data file: {}", e);
      return Err(Errors::FailedToSyncDataFile(e));
    }
    Ok(())
  }

  fn size(&self) -> u64 {
    let read_guard = self.fd.read();
    read_guard.metadata().map(|m| m.len()).unwrap_or(0)
  }
}

#[cfg(test)]
mod tests {
  use std::{fs, path::PathBuf};

  use super::*;

  #[test]
  fn test_file_io_write() {
    let path = PathBuf::from("/tmp/ember-kv-fio-write.data");
    let _ = fs::remove_file(&path);

    let fio = FileIO::new(&path).expect("failed to open file");
    let res1 = fio.write(b"key-a");
    assert_eq!(res1.unwrap(), 5);

    let res2 = fio.write(b"key-bc");
    assert_eq!(res2.unwrap(), 6);

    assert_eq!(fio.size(), 11);

    fs::remove_file(&path).unwrap();
  }

  #[test]
  fn test_file_io_read() {
    let path = PathBuf::from("/tmp/ember-kv-fio-read.data");
    let _ = fs::remove_file(&path);

    let fio = FileIO::new(&path).expect("failed to open file");
    fio.write(b"key-a").unwrap();
    fio.write(b"key-b").unwrap();

    let mut buf1 = [0u8; 5];
    let read1 = fio.read(&mut buf1, 0).unwrap();
    assert_eq!(read1, 5);
    assert_eq!(&buf1, b"key-a");

    let mut buf2 = [0u8; 5];
    let read2 = fio.read(&mut buf2, 5).unwrap();
    assert_eq!(read2, 5);
    assert_eq!(&buf2, b"key-b");

    // a read past end of file comes back short
    let mut buf3 = [0u8; 5];
    let read3 = fio.read(&mut buf3, 8).unwrap();
    assert_eq!(read3, 2);

    fs::remove_file(&path).unwrap();
  }

  #[test]
  fn test_file_io_sync() {
    let path = PathBuf::from("/tmp/ember-kv-fio-sync.data");
    let _ = fs::remove_file(&path);

    let fio = FileIO::new(&path).expect("failed to open file");
    fio.write(b"key-a").unwrap();
    assert!(fio.sync().is_ok());

    fs::remove_file(&path).unwrap();
  }
}
