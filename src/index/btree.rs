use std::{collections::BTreeMap, sync::Arc};

use parking_lot::RwLock;

use crate::data::log_record::LogRecordPos;

use super::Indexer;

/// Key directory backed by a `BTreeMap` behind a reader/writer lock.
pub struct BTree {
  tree: Arc<RwLock<BTreeMap<Vec<u8>, LogRecordPos>>>,
}

impl BTree {
  pub fn new() -> Self {
    Self {
      tree: Arc::new(RwLock::new(BTreeMap::new())),
    }
  }
}

impl Default for BTree {
  fn default() -> Self {
    Self::new()
  }
}

impl Indexer for BTree {
  fn put(&self, key: Vec<u8>, pos: LogRecordPos) -> Option<LogRecordPos> {
    let mut write_guard = self.tree.write();
    write_guard.insert(key, pos)
  }

  fn get(&self, key: Vec<u8>) -> Option<LogRecordPos> {
    let read_guard = self.tree.read();
    read_guard.get(&key).copied()
  }

  fn delete(&self, key: Vec<u8>) -> Option<LogRecordPos> {
    let mut write_guard = self.tree.write();
    write_guard.remove(&key)
  }

  fn len(&self) -> usize {
    let read_guard = self.tree.read();
    read_guard.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pos(file_id: u64, offset: u64) -> LogRecordPos {
    LogRecordPos {
      file_id,
      offset,
      size: 10,
      timestamp: 1,
    }
  }

  #[test]
  fn test_btree_put() {
    let bt = BTree::new();
    assert!(bt.put(b"a".to_vec(), pos(1, 10)).is_none());

    let prev = bt.put(b"a".to_vec(), pos(1, 40));
    assert_eq!(prev.unwrap().offset, 10);
    assert_eq!(bt.len(), 1);
  }

  #[test]
  fn test_btree_get() {
    let bt = BTree::new();
    bt.put(b"a".to_vec(), pos(1, 10));

    let got = bt.get(b"a".to_vec()).unwrap();
    assert_eq!(got.file_id, 1);
    assert_eq!(got.offset, 10);
    assert!(bt.get(b"missing".to_vec()).is_none());
  }

  #[test]
  fn test_btree_delete() {
    let bt = BTree::new();
    bt.put(b"a".to_vec(), pos(1, 10));

    let deleted = bt.delete(b"a".to_vec());
    assert_eq!(deleted.unwrap().offset, 10);
    assert!(bt.get(b"a".to_vec()).is_none());
    assert!(bt.delete(b"a".to_vec()).is_none());
    assert!(bt.is_empty());
  }
}
