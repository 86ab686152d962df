use std::future::Future;

use anyhow::Result;

use crate::cache::SyncCursor;
use crate::models::{DiscoveryImage, HealthStatus, NewPost, Post, PostId, PostPage, PostPatch};
use crate::session::Identity;

/// Remote operations the rest of the crate relies on.
///
/// `ApiClient` is the HTTP implementation; tests substitute scripted fakes.
pub trait PostGateway: Send + Sync {
    /// The same gateway acting as `identity`, sharing the underlying transport.
    fn with_identity(&self, identity: Identity) -> Self
    where
        Self: Sized;

    /// One page of posts, newest first. `since` restricts the page to posts
    /// after that cursor; `None` means all posts.
    fn list_posts(
        &self,
        page: u32,
        limit: u32,
        since: Option<SyncCursor>,
    ) -> impl Future<Output = Result<PostPage>> + Send;

    fn get_post(&self, id: PostId) -> impl Future<Output = Result<Post>> + Send;

    fn create_post(&self, post: &NewPost) -> impl Future<Output = Result<Post>> + Send;

    /// Partial update: only the fields set in `patch` change.
    fn update_post(&self, id: PostId, patch: &PostPatch)
        -> impl Future<Output = Result<Post>> + Send;

    /// Full replacement: fields left out of `post` are reset.
    fn replace_post(&self, id: PostId, post: &NewPost) -> impl Future<Output = Result<Post>> + Send;

    fn delete_post(&self, id: PostId) -> impl Future<Output = Result<()>> + Send;

    fn list_discovery_images(
        &self,
        count: u32,
    ) -> impl Future<Output = Result<Vec<DiscoveryImage>>> + Send;

    fn health(&self) -> impl Future<Output = Result<HealthStatus>> + Send;
}
