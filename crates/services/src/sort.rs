//! Feed orderings.

use std::cmp::Reverse;

use domains::{Post, SortMode};

/// Returns a reordered copy of `posts`. The input is never touched.
///
/// All orderings are stable: posts that compare equal keep their relative
/// input order. `SortMode::Unsorted` returns the input order as-is.
pub fn sort_posts(posts: &[Post], mode: &SortMode) -> Vec<Post> {
    let mut sorted = posts.to_vec();
    match mode {
        SortMode::Recent => sorted.sort_by_key(|p| Reverse(p.created_at)),
        SortMode::Popular => sorted.sort_by_key(|p| Reverse(p.engagement())),
        SortMode::Trending => sorted.sort_by_key(|p| Reverse(p.votes)),
        SortMode::Unsorted(_) => {}
    }
    sorted
}
