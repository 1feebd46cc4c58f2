//! # ForumStore
//!
//! Single point of access to persisted forum content. The store keeps no
//! state of its own; every call reads from or writes to the backing.
//!
//! Read-only calls never fail: a missing, unreadable or undecodable value is
//! replaced by an empty default, and single records that do not decode are
//! skipped. Mutating calls work on the raw JSON records so a record this
//! build cannot decode is written back untouched. They surface backing read
//! and write failures instead of overwriting a key they could not read.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    keys, new_id, Author, Comment, DomainError, KvStore, NewPost, Post, Result, StorageError,
    VoteChoice, ANONYMOUS, DEFAULT_CATEGORY, DEFAULT_COMMUNITY,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::drafts::PostDraft;
use crate::seed::demo_posts;

/// Net vote count per post id. Authoritative over `Post::votes`.
pub type VoteLedger = Map<String, Value>;
/// Comments per post id, newest first.
pub type CommentMap = Map<String, Value>;

pub struct ForumStore {
    backing: Arc<dyn KvStore>,
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn ledger_votes(ledger: &VoteLedger, id: &str) -> Option<i64> {
    ledger.get(id).and_then(Value::as_i64)
}

fn with_ledger_votes(mut post: Post, ledger: &VoteLedger) -> Post {
    if let Some(votes) = ledger_votes(ledger, &post.id) {
        post.votes = votes;
    }
    post
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Decodes each record on its own, skipping the ones that do not fit.
fn decode_records<T: DeserializeOwned>(key: &str, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(key, error = %err, "skipping undecodable record");
                None
            }
        })
        .collect()
}

fn decode_or<T: DeserializeOwned>(key: &str, raw: Option<String>, fallback: T) -> T {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return fallback;
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "corrupt value in backing, using fallback");
            fallback
        }
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| {
        DomainError::from(StorageError::Encode {
            key: key.to_string(),
            source,
        })
    })
}

impl ForumStore {
    pub fn new(backing: Arc<dyn KvStore>) -> Self {
        Self { backing }
    }

    /// Read path: any failure yields `fallback`.
    async fn read_json<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.backing.get(key).await {
            Ok(raw) => decode_or(key, raw, fallback),
            Err(err) => {
                warn!(key, error = %err, "backing read failed, using fallback");
                fallback
            }
        }
    }

    /// Write path: a backing read error is returned, only undecodable
    /// content degrades to `fallback`.
    async fn read_for_update<T: DeserializeOwned>(&self, key: &str, fallback: T) -> Result<T> {
        let raw = self.backing.get(key).await?;
        Ok(decode_or(key, raw, fallback))
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backing.set(key, raw).await?;
        Ok(())
    }

    /// Writes the demo posts when no posts exist, and creates the comment map
    /// and vote ledger when they are absent. Returns whether demo posts were
    /// written.
    pub async fn seed_if_empty(&self) -> Result<bool> {
        let existing: Option<Vec<Value>> = self.read_for_update(keys::POSTS, None).await?;
        let seeded = existing.as_ref().map_or(true, Vec::is_empty);
        let posts = if seeded {
            info!("seeding demo posts");
            let demo = encode(keys::POSTS, &demo_posts())?;
            self.write_json(keys::POSTS, &demo).await?;
            match demo {
                Value::Array(records) => records,
                _ => Vec::new(),
            }
        } else {
            existing.unwrap_or_default()
        };

        let comments: Option<CommentMap> = self.read_for_update(keys::COMMENTS, None).await?;
        if comments.is_none() {
            self.write_json(keys::COMMENTS, &CommentMap::new()).await?;
        }

        let ledger: Option<VoteLedger> = self.read_for_update(keys::VOTES, None).await?;
        if ledger.is_none() {
            let ledger: VoteLedger = posts
                .iter()
                .filter_map(|record| {
                    let votes = record.get("votes").and_then(Value::as_i64).unwrap_or(0);
                    record_id(record).map(|id| (id.to_string(), Value::from(votes)))
                })
                .collect();
            self.write_json(keys::VOTES, &ledger).await?;
        }

        Ok(seeded)
    }

    /// Every post in storage order, votes taken from the ledger.
    pub async fn get_all_posts(&self) -> Vec<Post> {
        let records: Vec<Value> = self.read_json(keys::POSTS, Vec::new()).await;
        let ledger: VoteLedger = self.read_json(keys::VOTES, VoteLedger::new()).await;
        let posts: Vec<Post> = decode_records(keys::POSTS, records);
        debug!(count = posts.len(), "loaded posts");
        posts
            .into_iter()
            .map(|post| with_ledger_votes(post, &ledger))
            .collect()
    }

    pub async fn get_post_by_id(&self, id: &str) -> Option<Post> {
        self.get_all_posts().await.into_iter().find(|p| p.id == id)
    }

    /// Prepends a new post and opens its ledger entry at zero. Performs no
    /// validation; see `publish` for the checked path.
    pub async fn add_post(&self, new_post: NewPost) -> Result<String> {
        let mut records: Vec<Value> = self.read_for_update(keys::POSTS, Vec::new()).await?;
        let mut ledger: VoteLedger = self.read_for_update(keys::VOTES, VoteLedger::new()).await?;

        let id = new_id();
        let post = Post {
            id: id.clone(),
            title: new_post.title,
            content: new_post.content,
            author: Author {
                username: or_default(&new_post.author_username, ANONYMOUS),
                reputation: 0,
            },
            community: or_default(&new_post.community, DEFAULT_COMMUNITY),
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
            votes: 0,
            comments: 0,
            views: 0,
            created_at: Utc::now(),
            is_pinned: false,
            is_solved: false,
            attachments: new_post.attachments,
        };
        records.insert(0, encode(keys::POSTS, &post)?);
        self.write_json(keys::POSTS, &records).await?;

        ledger.insert(id.clone(), Value::from(0));
        self.write_json(keys::VOTES, &ledger).await?;

        info!(post_id = %id, "post created");
        Ok(id)
    }

    /// Validates a draft, then stores it.
    pub async fn publish(&self, draft: PostDraft) -> Result<String> {
        let new_post = draft.into_new_post()?;
        self.add_post(new_post).await
    }

    /// Adds `delta` to the ledger entry for `id` and returns the new total.
    /// No bounds are enforced and unknown ids still get an entry.
    pub async fn vote_post(&self, id: &str, delta: i64) -> Result<i64> {
        let mut ledger: VoteLedger = self.read_for_update(keys::VOTES, VoteLedger::new()).await?;

        let records: Vec<Value> = self.read_json(keys::POSTS, Vec::new()).await;
        if !records.iter().any(|record| record_id(record) == Some(id)) {
            warn!(post_id = %id, "recording vote for unknown post");
        }

        let total = ledger_votes(&ledger, id).unwrap_or(0).saturating_add(delta);
        ledger.insert(id.to_string(), Value::from(total));
        self.write_json(keys::VOTES, &ledger).await?;

        info!(post_id = %id, delta, total, "vote recorded");
        Ok(total)
    }

    /// Moves a viewer's vote from `from` to `to` and returns the new total.
    pub async fn apply_vote(&self, id: &str, from: VoteChoice, to: VoteChoice) -> Result<i64> {
        self.vote_post(id, from.transition_delta(to)).await
    }

    pub async fn get_comments(&self, post_id: &str) -> Vec<Comment> {
        let mut all: CommentMap = self.read_json(keys::COMMENTS, CommentMap::new()).await;
        match all.remove(post_id) {
            Some(Value::Array(records)) => decode_records(keys::COMMENTS, records),
            _ => Vec::new(),
        }
    }

    /// Prepends a comment and bumps the owning post's counter. When the post
    /// is missing the comment is still kept and the counter is left alone.
    pub async fn add_comment(
        &self,
        post_id: &str,
        content: &str,
        author_username: &str,
    ) -> Result<String> {
        let mut all: CommentMap = self.read_for_update(keys::COMMENTS, CommentMap::new()).await?;
        let mut records: Vec<Value> = self.read_for_update(keys::POSTS, Vec::new()).await?;

        let comment = Comment {
            id: new_id(),
            content: content.to_string(),
            author: or_default(author_username, ANONYMOUS),
            created_at: Utc::now(),
        };
        let comment_id = comment.id.clone();
        let encoded = encode(keys::COMMENTS, &comment)?;
        match all.get_mut(post_id) {
            Some(Value::Array(list)) => list.insert(0, encoded),
            _ => {
                all.insert(post_id.to_string(), Value::Array(vec![encoded]));
            }
        }
        self.write_json(keys::COMMENTS, &all).await?;

        match records
            .iter_mut()
            .find(|record| record_id(record) == Some(post_id))
        {
            Some(record) => {
                let count = record.get("comments").and_then(Value::as_i64).unwrap_or(0);
                record["comments"] = Value::from(count.saturating_add(1));
                self.write_json(keys::POSTS, &records).await?;
            }
            None => warn!(post_id = %post_id, "comment stored for unknown post"),
        }

        info!(post_id = %post_id, comment_id = %comment_id, "comment added");
        Ok(comment_id)
    }

    pub async fn posts_by_author(&self, username: &str) -> Vec<Post> {
        self.get_all_posts()
            .await
            .into_iter()
            .filter(|p| p.author.username == username)
            .collect()
    }

    /// Category match ignores ASCII case.
    pub async fn posts_in_category(&self, category: &str) -> Vec<Post> {
        self.get_all_posts()
            .await
            .into_iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Like `get_post_by_id` but treats absence as an error.
    pub async fn require_post(&self, id: &str) -> Result<Post> {
        self.get_post_by_id(id)
            .await
            .ok_or_else(|| DomainError::NotFound("Post".into(), id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domains::MockKvStore;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl KvStore for MapStore {
        async fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: String) -> std::result::Result<(), StorageError> {
            self.0.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }
    }

    fn store() -> (Arc<MapStore>, ForumStore) {
        let backing = Arc::new(MapStore::default());
        (backing.clone(), ForumStore::new(backing))
    }

    fn failing_reads() -> MockKvStore {
        let mut mock = MockKvStore::new();
        mock.expect_get()
            .returning(|_| Err(StorageError::Backend("EIO".into())));
        mock
    }

    #[tokio::test]
    async fn ledger_overrides_embedded_votes() {
        let (backing, store) = store();
        store.seed_if_empty().await.unwrap();
        backing
            .set(keys::VOTES, r#"{"1": 100}"#.to_string())
            .await
            .unwrap();

        let posts = store.get_all_posts().await;
        assert_eq!(posts[0].votes, 100);
        // no ledger entry for "2": embedded value is used
        assert_eq!(posts[1].votes, 38);
    }

    #[tokio::test]
    async fn null_ledger_entry_falls_back_to_embedded_votes() {
        let (backing, store) = store();
        store.seed_if_empty().await.unwrap();
        backing
            .set(keys::VOTES, r#"{"1": null, "2": 5}"#.to_string())
            .await
            .unwrap();

        let posts = store.get_all_posts().await;
        assert_eq!((posts[0].votes, posts[1].votes), (42, 5));
    }

    #[tokio::test]
    async fn seed_derives_ledger_from_posts() {
        let (backing, store) = store();
        assert!(store.seed_if_empty().await.unwrap());
        let raw = backing.get(keys::VOTES).await.unwrap().unwrap();
        let ledger: VoteLedger = serde_json::from_str(&raw).unwrap();
        assert_eq!(ledger_votes(&ledger, "1"), Some(42));
        assert_eq!(ledger_votes(&ledger, "2"), Some(38));
        assert!(!store.seed_if_empty().await.unwrap());
    }

    #[tokio::test]
    async fn add_post_applies_defaults() {
        let (_, store) = store();
        let id = store
            .add_post(NewPost {
                title: "t".into(),
                content: "c".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let post = store.get_post_by_id(&id).await.unwrap();
        assert_eq!(post.author.username, ANONYMOUS);
        assert_eq!(post.community, DEFAULT_COMMUNITY);
        assert_eq!(post.category, DEFAULT_CATEGORY);
        assert_eq!((post.votes, post.comments, post.views), (0, 0, 0));
    }

    #[tokio::test]
    async fn whitespace_author_and_community_are_kept() {
        let (_, store) = store();
        let id = store
            .add_post(NewPost {
                title: "t".into(),
                content: "c".into(),
                author_username: " ".into(),
                community: "\t".into(),
                attachments: Vec::new(),
            })
            .await
            .unwrap();
        let post = store.get_post_by_id(&id).await.unwrap();
        assert_eq!(post.author.username, " ");
        assert_eq!(post.community, "\t");

        store.add_comment(&id, "hi", "  ").await.unwrap();
        assert_eq!(store.get_comments(&id).await[0].author, "  ");
    }

    #[tokio::test]
    async fn publish_rejects_blank_draft() {
        let (_, store) = store();
        let err = store.publish(PostDraft::new("", "body")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(store.get_all_posts().await.is_empty());
    }

    #[tokio::test]
    async fn apply_vote_switches_direction() {
        let (_, store) = store();
        store.seed_if_empty().await.unwrap();
        assert_eq!(store.apply_vote("1", VoteChoice::Neutral, VoteChoice::Up).await.unwrap(), 43);
        assert_eq!(store.apply_vote("1", VoteChoice::Up, VoteChoice::Down).await.unwrap(), 41);
        assert_eq!(store.apply_vote("1", VoteChoice::Down, VoteChoice::Neutral).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn comment_counter_saturates() {
        let (backing, store) = store();
        let raw = format!(
            r#"[{{"id":"big","createdAt":"2024-01-01T00:00:00Z","comments":{}}}]"#,
            i64::MAX
        );
        backing.set(keys::POSTS, raw).await.unwrap();

        store.add_comment("big", "one more", "x").await.unwrap();
        assert_eq!(store.get_post_by_id("big").await.unwrap().comments, i64::MAX);
    }

    #[tokio::test]
    async fn filters_by_author_and_category() {
        let (_, store) = store();
        store.seed_if_empty().await.unwrap();
        let mine = store.posts_by_author("sarah_dev").await;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "2");
        assert_eq!(store.posts_in_category("react").await.len(), 1);
        assert!(store.posts_in_category("rust").await.is_empty());
    }

    #[tokio::test]
    async fn require_post_reports_not_found() {
        let (_, store) = store();
        let err = store.require_post("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Post not found with ID missing");
    }

    #[tokio::test]
    async fn corrupt_values_read_as_empty() {
        let mut mock = MockKvStore::new();
        mock.expect_get().returning(|_| Ok(Some("{not json".to_string())));
        let store = ForumStore::new(Arc::new(mock));

        assert!(store.get_all_posts().await.is_empty());
        assert!(store.get_comments("1").await.is_empty());
        assert!(store.get_post_by_id("1").await.is_none());
    }

    #[tokio::test]
    async fn read_errors_fall_back_on_read_paths() {
        let store = ForumStore::new(Arc::new(failing_reads()));
        assert!(store.get_all_posts().await.is_empty());
        assert!(store.get_comments("1").await.is_empty());
    }

    #[tokio::test]
    async fn read_errors_abort_mutations_before_any_write() {
        let mut mock = failing_reads();
        mock.expect_set().never();
        let store = ForumStore::new(Arc::new(mock));

        let err = store
            .add_post(NewPost {
                title: "t".into(),
                content: "c".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(StorageError::Backend(_))));
        assert!(store.add_comment("1", "c", "a").await.is_err());
        assert!(store.vote_post("1", 1).await.is_err());
        assert!(store.seed_if_empty().await.is_err());
    }

    #[tokio::test]
    async fn posts_read_error_keeps_comments_untouched() {
        let mut mock = MockKvStore::new();
        mock.expect_get().returning(|key| match key {
            keys::POSTS => Err(StorageError::Backend("EIO".into())),
            _ => Ok(None),
        });
        mock.expect_set().never();
        let store = ForumStore::new(Arc::new(mock));

        assert!(store.add_comment("1", "c", "a").await.is_err());
    }

    #[tokio::test]
    async fn write_failures_propagate() {
        let mut mock = MockKvStore::new();
        mock.expect_get().returning(|_| Ok(None));
        mock.expect_set().returning(|key, value| {
            Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                needed: value.len(),
                limit: 0,
            })
        });
        let store = ForumStore::new(Arc::new(mock));

        let err = store.vote_post("1", 1).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Storage(StorageError::QuotaExceeded { .. })
        ));
    }
}
