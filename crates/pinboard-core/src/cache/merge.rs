use std::collections::HashSet;

use crate::models::{Post, PostId};

/// Result of merging a fetched batch into the cached collection.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub posts: Vec<Post>,
    /// Number of incoming posts that were not already cached.
    pub added: usize,
}

/// Merge `incoming` into `cached`, see [`merge_posts_counted`].
pub fn merge_posts(cached: &[Post], incoming: &[Post]) -> Vec<Post> {
    merge_posts_counted(cached, incoming).posts
}

/// Prepend the incoming posts whose id is not cached yet, keeping their
/// batch order, followed by the whole cached collection in its prior order.
///
/// A cached post is never replaced, even by a newer version with the same
/// id. No sorting happens: the output order depends only on the two input
/// orders.
pub fn merge_posts_counted(cached: &[Post], incoming: &[Post]) -> MergeOutcome {
    if cached.is_empty() {
        let posts = dedup_by_id(incoming);
        let added = posts.len();
        return MergeOutcome { posts, added };
    }

    if incoming.is_empty() {
        return MergeOutcome {
            posts: cached.to_vec(),
            added: 0,
        };
    }

    let mut seen: HashSet<PostId> = cached.iter().map(|p| p.id).collect();
    let unique: Vec<Post> = incoming
        .iter()
        .filter(|p| seen.insert(p.id))
        .cloned()
        .collect();

    let added = unique.len();
    let mut posts = unique;
    posts.extend_from_slice(cached);

    MergeOutcome { posts, added }
}

/// Keep the first occurrence of every id.
fn dedup_by_id(posts: &[Post]) -> Vec<Post> {
    let mut seen = HashSet::with_capacity(posts.len());
    posts.iter().filter(|p| seen.insert(p.id)).cloned().collect()
}
