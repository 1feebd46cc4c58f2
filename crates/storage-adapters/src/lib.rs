//! # storage-adapters
//!
//! Implementations of the `KvStore` port.
//! - `MemoryKvStore`: process-local map with an optional byte quota.
//! - `FileKvStore`: one JSON document per key under a data directory.

pub mod file;
pub mod memory;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;
