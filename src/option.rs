use lazy_static::lazy_static;
use std::path::PathBuf;

lazy_static! {
  pub static ref DEFAULT_DIR_PATH: PathBuf = std::env::temp_dir().join("ember-kv");
}

#[derive(Debug, Clone)]
pub struct Options {
  pub dir_path: PathBuf,

  pub sync_writes: bool,

  pub bytes_per_sync: usize,

  pub index_type: IndexType,

  pub mmap_at_startup: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
  BTree,

  SkipList,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      dir_path: DEFAULT_DIR_PATH.clone(),
      sync_writes: false,
      bytes_per_sync: 0,
      index_type: IndexType::BTree,
      mmap_at_startup: true,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IOManagerType {
  StandardFileIO,

  MemoryMap,
}

/// Which storage engine `storage::new_storage` constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineType {
  /// The on-disk log-structured engine.
  Bitcask,

  /// The all-in-memory engine; same surface, no durability.
  Memory,
}
