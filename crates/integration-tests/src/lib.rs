//! Shared fixtures for the cross-crate test suites.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use domains::{Author, Post};
use services::ForumStore;
use storage_adapters::MemoryKvStore;

/// A store over a fresh in-memory backing. The backing handle is returned
/// too so tests can inspect or corrupt raw values.
pub fn memory_store() -> (Arc<MemoryKvStore>, ForumStore) {
    let backing = Arc::new(MemoryKvStore::new());
    let store = ForumStore::new(backing.clone());
    (backing, store)
}

/// Like `memory_store`, already seeded with the demo posts.
pub async fn seeded_store() -> (Arc<MemoryKvStore>, ForumStore) {
    let (backing, store) = memory_store();
    store.seed_if_empty().await.expect("seeding an empty memory store");
    (backing, store)
}

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// A post with the given engagement, created `minutes_ago` before a fixed instant.
pub fn post_fixture(id: &str, votes: i64, comments: i64, views: i64, minutes_ago: i64) -> Post {
    Post {
        id: id.to_string(),
        title: format!("Post {id}"),
        content: "fixture".to_string(),
        author: Author {
            username: "fixture_user".to_string(),
            reputation: 0,
        },
        community: "general".to_string(),
        category: "General".to_string(),
        tags: Vec::new(),
        votes,
        comments,
        views,
        created_at: base_time() - Duration::minutes(minutes_ago),
        is_pinned: false,
        is_solved: false,
        attachments: Vec::new(),
    }
}

pub fn ids(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.id.as_str()).collect()
}
