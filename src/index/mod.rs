pub mod btree;
pub mod skiplist;

use crate::{data::log_record::LogRecordPos, option::IndexType};

/// The in-memory key directory: maps each live key to the position of its
/// most recent value on disk. A key is live iff it is present here.
pub trait Indexer: Sync + Send {
  /// Inserts or replaces a key's position, returning the previous one.
  fn put(&self, key: Vec<u8>, pos: LogRecordPos) -> Option<LogRecordPos>;

  /// Retrieves a key's position from the index.
  fn get(&self, key: Vec<u8>) -> Option<LogRecordPos>;

  /// Deletes a key's position from the index.
  fn delete(&self, key: Vec<u8>) -> Option<LogRecordPos>;

  /// Number of live keys.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Creates a new indexer based on the specified index type.
pub fn new_indexer(index_type: &IndexType) -> Box<dyn Indexer> {
  match *index_type {
    IndexType::BTree => Box::new(btree::BTree::new()),
    IndexType::SkipList => Box::new(skiplist::SkipList::new()),
  }
}
