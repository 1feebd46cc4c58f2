//! forum/crates/domains/src/lib.rs
//!
//! The central domain model and port definitions for the forum store.

pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;

#[cfg(test)]
mod tests {
    use super::models::*;

    #[test]
    fn test_post_id_is_time_ordered() {
        let first = new_id();
        let second = new_id();
        assert_ne!(first, second);
        assert!(first < second, "v7 ids must sort by creation time");
    }

    #[test]
    fn test_post_decodes_with_missing_optional_fields() {
        // Older records carry no attachments and no engagement counters.
        let raw = r#"{
            "id": "7",
            "title": "Hello",
            "content": "World",
            "author": { "username": "alice", "reputation": 3 },
            "community": "general",
            "category": "General",
            "createdAt": "2024-01-15T10:30:00Z"
        }"#;
        let post: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(post.votes, 0);
        assert_eq!(post.comments, 0);
        assert!(post.attachments.is_empty());
        assert!(!post.is_pinned);
    }
}
