//! Local post cache.
//!
//! `PostCache` owns the two persisted records: the post collection and the
//! sync cursor marking the last successful fetch. Nothing else reads or
//! writes those keys. `merge_posts` reconciles a cached collection with a
//! freshly fetched batch.

pub mod cursor;
pub mod manager;
pub mod merge;

pub use cursor::SyncCursor;
pub use manager::{CacheSnapshot, PostCache, CURSOR_KEY, POSTS_KEY};
pub use merge::{merge_posts, merge_posts_counted, MergeOutcome};
