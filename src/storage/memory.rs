use std::{
  collections::HashMap,
  sync::atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::errors::{Errors, Result};

use super::Storage;

/// Trivial all-in-memory engine: a hash map behind a reader/writer lock.
///
/// Same operation contracts as the on-disk engine, no durability. Nothing
/// survives `close`, and no directory lock is taken since there is no
/// directory.
pub struct MemoryEngine {
  map: RwLock<HashMap<Vec<u8>, Bytes>>,
  closed: AtomicBool,
}

impl MemoryEngine {
  pub fn new() -> Self {
    Self {
      map: RwLock::new(HashMap::new()),
      closed: AtomicBool::new(false),
    }
  }

  fn check_open(&self) -> Result<()> {
    if self.closed.load(Ordering::SeqCst) {
      return Err(Errors::DatabaseClosed);
    }
    Ok(())
  }
}

impl Default for MemoryEngine {
  fn default() -> Self {
    Self::new()
  }
}

impl Storage for MemoryEngine {
  fn get(&self, key: Bytes) -> Result<Bytes> {
    let map = self.map.read();
    self.check_open()?;
    match map.get(key.as_ref()) {
      Some(value) => Ok(value.clone()),
      None => Err(Errors::KeyNotFound),
    }
  }

  fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
    if key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }
    let mut map = self.map.write();
    self.check_open()?;
    map.insert(key.to_vec(), value);
    Ok(())
  }

  fn delete(&self, key: Bytes) -> Result<()> {
    let mut map = self.map.write();
    self.check_open()?;
    map.remove(key.as_ref());
    Ok(())
  }

  fn close(&self) -> Result<()> {
    let _map = self.map.write();
    self.closed.store(true, Ordering::SeqCst);
    Ok(())
  }
}
