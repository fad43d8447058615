use std::sync::Arc;

use crossbeam_skiplist::SkipMap;

use crate::data::log_record::LogRecordPos;

use super::Indexer;

/// Key directory backed by a lock-free skip list.
pub struct SkipList {
  skl: Arc<SkipMap<Vec<u8>, LogRecordPos>>,
}

impl SkipList {
  pub fn new() -> Self {
    Self {
      skl: Arc::new(SkipMap::new()),
    }
  }
}

impl Default for SkipList {
  fn default() -> Self {
    Self::new()
  }
}

impl Indexer for SkipList {
  fn put(&self, key: Vec<u8>, pos: LogRecordPos) -> Option<LogRecordPos> {
    let prev = self.skl.get(&key).map(|entry| *entry.value());
    self.skl.insert(key, pos);
    prev
  }

  fn get(&self, key: Vec<u8>) -> Option<LogRecordPos> {
    self.skl.get(&key).map(|entry| *entry.value())
  }

  fn delete(&self, key: Vec<u8>) -> Option<LogRecordPos> {
    self.skl.remove(&key).map(|entry| *entry.value())
  }

  fn len(&self) -> usize {
    self.skl.len()
  }
}
