use tracing::debug;

use crate::models::Post;
use crate::store::{KeyValueBackend, LocalStore};

use super::SyncCursor;

/// Store key of the cached post collection (a JSON array of posts).
pub const POSTS_KEY: &str = "pinboard_posts_cache";

/// Store key of the sync cursor (an ISO-8601 string).
pub const CURSOR_KEY: &str = "pinboard_last_sync";

/// Both cache records as read at one point in time.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    pub posts: Option<Vec<Post>>,
    pub cursor: Option<SyncCursor>,
}

pub struct PostCache<B> {
    store: LocalStore<B>,
}

impl<B: KeyValueBackend> PostCache<B> {
    pub fn new(backend: B) -> Self {
        Self {
            store: LocalStore::new(backend),
        }
    }

    // ===== Posts =====

    pub fn load_posts(&self) -> Option<Vec<Post>> {
        let posts: Option<Vec<Post>> = self.store.get(POSTS_KEY);
        debug!(count = posts.as_ref().map(Vec::len), "Loaded cached posts");
        posts
    }

    pub fn save_posts(&self, posts: &[Post]) -> bool {
        self.store.set(POSTS_KEY, posts)
    }

    // ===== Sync cursor =====

    pub fn cursor(&self) -> Option<SyncCursor> {
        let raw: String = self.store.get(CURSOR_KEY)?;
        let cursor = SyncCursor::parse(&raw);
        if cursor.is_none() {
            debug!(raw = %raw, "Ignoring unparseable sync cursor");
        }
        cursor
    }

    pub fn set_cursor(&self, cursor: &SyncCursor) -> bool {
        self.store.set(CURSOR_KEY, &cursor.to_iso())
    }

    // ===== Whole cache =====

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            posts: self.load_posts(),
            cursor: self.cursor(),
        }
    }

    /// Drop both records. The next sync performs a full fetch.
    pub fn clear(&self) {
        self.store.remove(POSTS_KEY);
        self.store.remove(CURSOR_KEY);
    }

    /// Human readable time since the last successful sync.
    pub fn last_synced_display(&self) -> String {
        self.cursor()
            .map(|c| c.age_display())
            .unwrap_or_else(|| "never".to_string())
    }
}
