//! # Core Traits (Ports)
//!
//! Any storage backing must implement these traits to be used by the store.

use async_trait::async_trait;

use crate::errors::StorageError;

/// Fixed backing keys. Values under them are JSON documents.
pub mod keys {
    /// Sequence of `Post`, newest first.
    pub const POSTS: &str = "forum_posts";
    /// Mapping of post id to a sequence of `Comment`, newest first.
    pub const COMMENTS: &str = "forum_comments";
    /// Mapping of post id to its net vote count.
    pub const VOTES: &str = "forum_votes";
}

/// Durable string storage addressed by key.
///
/// Each call is atomic for its key. Nothing coordinates a read followed by a
/// write, so a read-modify-write sequence assumes a single writer.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the raw value, or `None` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites the value for `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}
