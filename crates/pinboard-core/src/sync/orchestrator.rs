use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::api::PostGateway;
use crate::cache::{merge_posts_counted, CacheSnapshot, PostCache, SyncCursor};
use crate::models::Post;
use crate::session::Identity;
use crate::store::KeyValueBackend;

use super::SingleFlight;

// ============================================================================
// Constants
// ============================================================================

/// Posts requested per fetch. Only the first page is ever requested.
pub const PAGE_SIZE: u32 = 50;

const FIRST_PAGE: u32 = 1;

// ============================================================================
// Sync state
// ============================================================================

/// Lifecycle of a synchronization: `Idle -> Loading -> {Success, Degraded, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Loading,
    /// Fresh data, or the cache was confirmed current.
    Success,
    /// The network failed but cached posts are shown.
    Degraded,
    /// The network failed and there is nothing cached to show.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First page with no time filter.
    Full,
    /// First page restricted to posts after the sync cursor.
    Delta,
}

/// What a synchronization hands to the presentation layer.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub posts: Vec<Post>,
    pub state: SyncState,
    pub mode: Option<FetchMode>,
    /// Posts that were not in the cache before this run.
    pub added: usize,
    /// Cursor in effect after this run.
    pub cursor: Option<SyncCursor>,
    /// Warning (Degraded) or error (Failed) text for the user.
    pub message: Option<String>,
}

impl SyncReport {
    fn success(posts: Vec<Post>, mode: FetchMode, added: usize, cursor: Option<SyncCursor>) -> Self {
        Self {
            posts,
            state: SyncState::Success,
            mode: Some(mode),
            added,
            cursor,
            message: None,
        }
    }

    /// Stale data is shown alongside a message.
    pub fn is_warning(&self) -> bool {
        self.state == SyncState::Degraded
    }

    /// Nothing could be shown.
    pub fn is_error(&self) -> bool {
        self.state == SyncState::Failed
    }
}

// ============================================================================
// Synchronizer
// ============================================================================

pub struct Synchronizer<G, B> {
    gateway: G,
    cache: PostCache<B>,
    states: Mutex<HashMap<Identity, SyncState>>,
    flights: SingleFlight<Identity, SyncReport>,
}

impl<G, B> Synchronizer<G, B>
where
    G: PostGateway,
    B: KeyValueBackend,
{
    pub fn new(gateway: G, cache: PostCache<B>) -> Self {
        Self {
            gateway,
            cache,
            states: Mutex::new(HashMap::new()),
            flights: SingleFlight::new(),
        }
    }

    pub fn cache(&self) -> &PostCache<B> {
        &self.cache
    }

    /// State of the most recent run for `identity`; `Idle` before its first.
    pub fn state(&self, identity: &Identity) -> SyncState {
        self.states_guard()
            .get(identity)
            .copied()
            .unwrap_or(SyncState::Idle)
    }

    fn states_guard(&self) -> MutexGuard<'_, HashMap<Identity, SyncState>> {
        self.states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, identity: &Identity, state: SyncState) {
        self.states_guard().insert(identity.clone(), state);
    }

    /// Bring the local collection up to date for `identity`.
    ///
    /// Calls for the same identity that overlap share a single run. This
    /// never fails: every error ends up in the report's state and message.
    pub async fn synchronize(&self, identity: &Identity) -> SyncReport {
        self.flights
            .run(identity.clone(), || self.run_once(identity))
            .await
    }

    /// Re-sync after a create, edit or delete went through the gateway.
    pub async fn refresh_after_write(&self, identity: &Identity) -> SyncReport {
        debug!(user = %identity, "Refreshing feed after write");
        self.synchronize(identity).await
    }

    async fn run_once(&self, identity: &Identity) -> SyncReport {
        self.set_state(identity, SyncState::Loading);
        let gateway = self.gateway.with_identity(identity.clone());

        let report = match self.try_sync(&gateway).await {
            Ok(report) => report,
            Err(e) => self.fall_back_to_cache(&e),
        };

        self.set_state(identity, report.state);
        info!(
            user = %identity,
            state = ?report.state,
            mode = ?report.mode,
            count = report.posts.len(),
            added = report.added,
            "Sync finished"
        );
        report
    }

    async fn try_sync(&self, gateway: &G) -> Result<SyncReport> {
        let CacheSnapshot { posts, cursor } = self.cache.snapshot();
        match (posts, cursor) {
            (Some(cached), Some(cursor)) => Ok(self.delta_sync(gateway, cached, cursor).await),
            _ => self.full_sync(gateway).await,
        }
    }

    /// First run or cleared cache: the fetched page becomes the collection.
    async fn full_sync(&self, gateway: &G) -> Result<SyncReport> {
        debug!("No usable cache, performing full fetch");
        let page = gateway.list_posts(FIRST_PAGE, PAGE_SIZE, None).await?;
        let posts = page.posts;
        let added = posts.len();
        let cursor = self.persist(&posts);
        Ok(SyncReport::success(posts, FetchMode::Full, added, cursor))
    }

    async fn delta_sync(&self, gateway: &G, cached: Vec<Post>, cursor: SyncCursor) -> SyncReport {
        debug!(since = %cursor, cached = cached.len(), "Performing delta fetch");
        let page = match gateway.list_posts(FIRST_PAGE, PAGE_SIZE, Some(cursor)).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Delta fetch failed, using cached posts");
                return SyncReport {
                    posts: cached,
                    state: SyncState::Degraded,
                    mode: Some(FetchMode::Delta),
                    added: 0,
                    cursor: Some(cursor),
                    message: Some(format!("Could not check for new posts: {:#}", e)),
                };
            }
        };

        let outcome = merge_posts_counted(&cached, &page.posts);
        if outcome.added == 0 {
            // Nothing new observed: keep the cursor where it is
            debug!(fetched = page.posts.len(), "No new posts since last sync");
            return SyncReport::success(cached, FetchMode::Delta, 0, Some(cursor));
        }

        let new_cursor = self.persist(&outcome.posts).or(Some(cursor));
        SyncReport::success(outcome.posts, FetchMode::Delta, outcome.added, new_cursor)
    }

    /// Save the collection and, only if that worked, advance the cursor.
    fn persist(&self, posts: &[Post]) -> Option<SyncCursor> {
        if !self.cache.save_posts(posts) {
            warn!(count = posts.len(), "Posts not cached; sync cursor left unchanged");
            return None;
        }
        let cursor = SyncCursor::now();
        if !self.cache.set_cursor(&cursor) {
            return None;
        }
        Some(cursor)
    }

    fn fall_back_to_cache(&self, err: &anyhow::Error) -> SyncReport {
        let message = format!("{:#}", err);
        match self.cache.load_posts() {
            Some(posts) => {
                warn!(error = %message, count = posts.len(), "Sync failed, serving cached posts");
                SyncReport {
                    posts,
                    state: SyncState::Degraded,
                    mode: None,
                    added: 0,
                    cursor: self.cache.cursor(),
                    message: Some(format!("Showing cached posts: {}", message)),
                }
            }
            None => {
                error!(error = %message, "Sync failed with no cached posts");
                SyncReport {
                    posts: Vec::new(),
                    state: SyncState::Failed,
                    mode: None,
                    added: 0,
                    cursor: None,
                    message: Some(format!("Could not load posts: {}", message)),
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
