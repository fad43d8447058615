pub mod memory;

use bytes::Bytes;

use crate::{
  db::Engine,
  errors::Result,
  option::{EngineType, Options},
};

use self::memory::MemoryEngine;

/// Common surface of the storage engines.
///
/// Both the on-disk engine and the in-memory engine implement this; they
/// share the same operation contracts and differ only in durability,
/// directory locking, and startup behavior.
pub trait Storage: Sync + Send {
  fn get(&self, key: Bytes) -> Result<Bytes>;

  fn put(&self, key: Bytes, value: Bytes) -> Result<()>;

  fn delete(&self, key: Bytes) -> Result<()>;

  fn close(&self) -> Result<()>;
}

/// Creates a storage engine of the requested kind. The in-memory engine
/// ignores `options`.
pub fn new_storage(engine_type: &EngineType, options: Options) -> Result<Box<dyn Storage>> {
  match *engine_type {
    EngineType::Bitcask => Ok(Box::new(Engine::open(options)?)),
    EngineType::Memory => Ok(Box::new(MemoryEngine::new())),
  }
}

impl Storage for Engine {
  fn get(&self, key: Bytes) -> Result<Bytes> {
    Engine::get(self, key)
  }

  fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
    Engine::put(self, key, value)
  }

  fn delete(&self, key: Bytes) -> Result<()> {
    Engine::delete(self, key)
  }

  fn close(&self) -> Result<()> {
    Engine::close(self)
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  #[test]
  fn test_new_storage_memory() {
    let storage = new_storage(&EngineType::Memory, Options::default()).unwrap();
    storage.put(Bytes::from("a"), Bytes::from("1")).unwrap();
    assert_eq!(storage.get(Bytes::from("a")).unwrap(), Bytes::from("1"));
    storage.close().unwrap();
  }

  #[test]
  fn test_new_storage_bitcask() {
    let dir = std::env::temp_dir().join("ember-kv-storage-factory");
    let _ = fs::remove_dir_all(&dir);

    let mut opts = Options::default();
    opts.dir_path = dir.clone();
    let storage = new_storage(&EngineType::Bitcask, opts).unwrap();
    storage.put(Bytes::from("a"), Bytes::from("1")).unwrap();
    assert_eq!(storage.get(Bytes::from("a")).unwrap(), Bytes::from("1"));
    storage.close().unwrap();

    fs::remove_dir_all(&dir).unwrap();
  }
}
