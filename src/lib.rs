//! Ember-KV: an embeddable log-structured key-value storage engine in the
//! Bitcask tradition.
//!
//! Every write is appended to the active data file and indexed by an
//! in-memory key directory that points at the exact byte location of the
//! most recent value, so reads cost at most one positional disk read.
//! Deletion writes a tombstone record; restart rebuilds the key directory
//! by scanning the data files.
//!
//! # Features
//!
//! * Append-only writes, single positional read per lookup
//! * Crash-tolerant startup scan that keeps everything before a torn tail
//! * Single-writer discipline: an advisory file lock keeps other
//!   processes out, a reader/writer lock serializes writers in-process
//! * Pluggable key directory implementations (B-tree, skip list)
//! * Optional memory-mapped I/O for faster startup
//! * A trivial in-memory engine behind the same [`storage::Storage`]
//!   surface for callers that do not need durability
//!
//! # Basic Usage
//!
//! ```
//! use bytes::Bytes;
//! use ember_kv::{db::Engine, option::Options};
//!
//! let mut opts = Options::default();
//! opts.dir_path = std::env::temp_dir().join("ember-kv-doc");
//! let engine = Engine::open(opts).expect("failed to open ember-kv engine");
//!
//! // Store a key-value pair
//! let key = Bytes::from(b"hello".to_vec());
//! let value = Bytes::from(b"world".to_vec());
//! engine.put(key.clone(), value.clone()).expect("failed to put");
//!
//! // Retrieve the value
//! let retrieved = engine.get(key.clone()).expect("failed to get");
//! assert_eq!(retrieved, value);
//!
//! // Delete the key and shut down
//! engine.delete(key).expect("failed to delete");
//! engine.close().expect("failed to close");
//! ```

mod data;

mod fio;
mod index;

pub mod db;
pub mod errors;
pub mod option;
pub mod storage;
pub mod util;
