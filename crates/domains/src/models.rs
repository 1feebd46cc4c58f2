//! # Domain Models
//!
//! These structs represent the persisted entities of the forum.
//! Field names serialize in camelCase to keep the stored documents stable.
//! New identifiers are UUID v7 strings, so they are unique and sort by
//! creation time. Seeded records keep their short numeric ids.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Username recorded when a caller supplies none.
pub const ANONYMOUS: &str = "anonymous";
/// Community assigned when a caller supplies none.
pub const DEFAULT_COMMUNITY: &str = "general";
/// Category given to every newly created post.
pub const DEFAULT_CATEGORY: &str = "General";

/// Generates a fresh, time-ordered identifier.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses an ISO-8601 timestamp. Accepts a full RFC 3339 value, a date-time
/// without offset, or a bare date. The last two are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp {raw:?}")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reputation: i64,
}

impl Default for Author {
    fn default() -> Self {
        Self {
            username: ANONYMOUS.to_string(),
            reputation: 0,
        }
    }
}

/// The fundamental unit of conversation.
///
/// Decoding is forgiving: apart from `id` and `createdAt`, missing or `null`
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: Author,
    #[serde(default, deserialize_with = "null_as_default")]
    pub community: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Embedded vote count. Only consulted when the ledger has no entry.
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: i64,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_pinned: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_solved: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<Attachment>,
}

impl Post {
    /// Combined engagement used by the "popular" ordering.
    pub fn engagement(&self) -> i64 {
        self.votes
            .saturating_add(self.comments)
            .saturating_add(self.views)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    File,
}

/// A file attached to a post. Only images carry content, embedded as a
/// base64 data URI; other files keep just their name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

impl Attachment {
    pub fn image(name: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Image,
            name: name.into(),
            data_url: Some(data_url.into()),
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::File,
            name: name.into(),
            data_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Input for `ForumStore::add_post`. Empty author and community fall back to
/// `ANONYMOUS` and `DEFAULT_COMMUNITY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_username: String,
    pub community: String,
    pub attachments: Vec<Attachment>,
}

/// Named orderings understood by `sort_posts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortMode {
    /// Newest `created_at` first.
    Recent,
    /// Highest `votes + comments + views` first.
    Popular,
    /// Highest `votes` first.
    Trending,
    /// Any other name, kept verbatim. Leaves input order untouched.
    Unsorted(String),
}

impl FromStr for SortMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "recent" => SortMode::Recent,
            "popular" => SortMode::Popular,
            "trending" => SortMode::Trending,
            other => SortMode::Unsorted(other.to_string()),
        })
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Recent => f.write_str("recent"),
            SortMode::Popular => f.write_str("popular"),
            SortMode::Trending => f.write_str("trending"),
            SortMode::Unsorted(name) => f.write_str(name),
        }
    }
}

/// A single viewer's vote on a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Up,
    Down,
    #[default]
    Neutral,
}

impl VoteChoice {
    fn weight(self) -> i64 {
        match self {
            VoteChoice::Up => 1,
            VoteChoice::Down => -1,
            VoteChoice::Neutral => 0,
        }
    }

    /// Pressing the active direction again clears it.
    pub fn toggle(self, pressed: VoteChoice) -> VoteChoice {
        if self == pressed {
            VoteChoice::Neutral
        } else {
            pressed
        }
    }

    /// Ledger delta that moves a vote from `self` to `next`.
    pub fn transition_delta(self, next: VoteChoice) -> i64 {
        next.weight() - self.weight()
    }
}
