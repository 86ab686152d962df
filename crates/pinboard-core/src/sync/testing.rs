//! Scripted gateway for exercising sync and compose logic without a server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::api::PostGateway;
use crate::cache::SyncCursor;
use crate::models::{DiscoveryImage, HealthStatus, NewPost, Post, PostId, PostPage, PostPatch};
use crate::session::Identity;

/// One recorded call to the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List {
        identity: String,
        page: u32,
        limit: u32,
        since: Option<SyncCursor>,
    },
    Get(PostId),
    Create(NewPost),
    Update(PostId, PostPatch),
    Replace(PostId, NewPost),
    Delete(PostId),
}

#[derive(Default)]
struct FakeState {
    list_responses: Mutex<VecDeque<Result<Vec<Post>, String>>>,
    posts: Mutex<Vec<Post>>,
    calls: Mutex<Vec<Call>>,
    delay: Mutex<Option<Duration>>,
}

#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<FakeState>,
    identity: Identity,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next `list_posts` call.
    pub fn push_list(&self, response: Result<Vec<Post>, &str>) {
        self.state
            .list_responses
            .lock()
            .unwrap()
            .push_back(response.map_err(str::to_string));
    }

    /// Posts served by `get_post` and mutated by create/update/delete.
    pub fn seed(&self, posts: Vec<Post>) {
        *self.state.posts.lock().unwrap() = posts;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::List { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.calls.lock().unwrap().push(call);
    }

    fn find(&self, id: PostId) -> Result<Post> {
        self.state
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("Post no encontrado"))
    }

    fn store(&self, post: Post) {
        let mut posts = self.state.posts.lock().unwrap();
        match posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => *existing = post,
            None => posts.insert(0, post),
        }
    }
}

impl PostGateway for FakeGateway {
    fn with_identity(&self, identity: Identity) -> Self {
        Self {
            state: Arc::clone(&self.state),
            identity,
        }
    }

    async fn list_posts(&self, page: u32, limit: u32, since: Option<SyncCursor>) -> Result<PostPage> {
        self.record(Call::List {
            identity: self.identity.to_string(),
            page,
            limit,
            since,
        });
        let delay = *self.state.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.state.list_responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(posts)) => Ok(PostPage {
                posts,
                ..Default::default()
            }),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no list response scripted")),
        }
    }

    async fn get_post(&self, id: PostId) -> Result<Post> {
        self.record(Call::Get(id));
        self.find(id)
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        self.record(Call::Create(post.clone()));
        let next_id = self
            .state
            .posts
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        let created = Post {
            id: PostId(next_id),
            user_id: self.identity.to_string(),
            image_url: post.image_url.clone(),
            description: post.description.clone(),
            tags: post.tags.clone(),
            created_at: "2026-10-16T00:00:00".to_string(),
            updated_at: "2026-10-16T00:00:00".to_string(),
        };
        self.store(created.clone());
        Ok(created)
    }

    async fn update_post(&self, id: PostId, patch: &PostPatch) -> Result<Post> {
        self.record(Call::Update(id, patch.clone()));
        let mut post = self.find(id)?;
        if let Some(url) = &patch.image_url {
            post.image_url = url.clone();
        }
        if let Some(description) = &patch.description {
            post.description = description.clone();
        }
        if let Some(tags) = &patch.tags {
            post.tags = tags.clone();
        }
        self.store(post.clone());
        Ok(post)
    }

    async fn replace_post(&self, id: PostId, body: &NewPost) -> Result<Post> {
        self.record(Call::Replace(id, body.clone()));
        let mut post = self.find(id)?;
        post.image_url = body.image_url.clone();
        post.description = body.description.clone();
        post.tags = body.tags.clone();
        self.store(post.clone());
        Ok(post)
    }

    async fn delete_post(&self, id: PostId) -> Result<()> {
        self.record(Call::Delete(id));
        self.find(id)?;
        self.state.posts.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn list_discovery_images(&self, _count: u32) -> Result<Vec<DiscoveryImage>> {
        Err(anyhow!("discovery not scripted"))
    }

    async fn health(&self) -> Result<HealthStatus> {
        Err(anyhow!("health not scripted"))
    }
}
