//! Demo content written into an empty store.

use chrono::{DateTime, TimeZone, Utc};
use domains::{Author, Post};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

/// The two posts every fresh instance starts with.
pub fn demo_posts() -> Vec<Post> {
    vec![
        Post {
            id: "1".into(),
            title: "How to Build a Modern React Application with Hooks".into(),
            content: "In this comprehensive guide, I'll walk you through building a modern \
                      React application using functional components and hooks..."
                .into(),
            author: Author {
                username: "john_doe".into(),
                reputation: 1250,
            },
            community: "reactjs".into(),
            category: "React".into(),
            tags: vec![
                "react".into(),
                "hooks".into(),
                "javascript".into(),
                "frontend".into(),
            ],
            votes: 42,
            comments: 18,
            views: 1250,
            created_at: at(2024, 1, 15, 10, 30),
            is_pinned: true,
            is_solved: false,
            attachments: Vec::new(),
        },
        Post {
            id: "2".into(),
            title: "Best Practices for Node.js API Development".into(),
            content: "After building dozens of Node.js APIs, here are the essential best \
                      practices I've learned..."
                .into(),
            author: Author {
                username: "sarah_dev".into(),
                reputation: 2100,
            },
            community: "node".into(),
            category: "Node.js".into(),
            tags: vec![
                "nodejs".into(),
                "api".into(),
                "backend".into(),
                "best-practices".into(),
            ],
            votes: 38,
            comments: 12,
            views: 980,
            created_at: at(2024, 1, 14, 15, 45),
            is_pinned: false,
            is_solved: true,
            attachments: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_posts_have_distinct_ids_and_valid_dates() {
        let posts = demo_posts();
        assert_eq!(posts.len(), 2);
        assert_ne!(posts[0].id, posts[1].id);
        assert_eq!(posts[0].created_at.to_rfc3339(), "2024-01-15T10:30:00+00:00");
        assert!(posts[0].created_at > posts[1].created_at);
    }
}
