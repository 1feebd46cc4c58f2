//! # services
//!
//! Forum content operations built on the `KvStore` port: the post, vote and
//! comment store, its seed data, the feed orderings, and the helpers callers
//! run before publishing (draft validation, attachment encoding).

pub mod attachments;
pub mod drafts;
pub mod forum_store;
pub mod seed;
pub mod sort;

pub use attachments::{prepare_attachments, Upload};
pub use drafts::PostDraft;
pub use forum_store::ForumStore;
pub use sort::sort_posts;
