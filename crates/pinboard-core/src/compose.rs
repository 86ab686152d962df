//! Post editing: panel modes, form drafts and their submission.
//!
//! The panel is always in exactly one [`PanelMode`]. A [`PostDraft`] holds
//! the form fields; it is validated before anything is sent, and for edits
//! it is reduced to the fields that actually changed.

use thiserror::Error;
use tracing::{debug, info};

use crate::api::PostGateway;
use crate::models::{NewPost, Post, PostId, PostPatch};
use crate::session::Identity;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Image URL is required")]
    MissingImageUrl,
}

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Post {0} belongs to another user")]
    NotOwner(PostId),

    #[error(transparent)]
    Api(#[from] anyhow::Error),
}

/// What the editing panel is doing.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelMode {
    Create { prefill: Option<String> },
    Edit(Post),
    Delete(Post),
}

impl PanelMode {
    /// Selecting a post opens it for editing; otherwise the panel creates,
    /// optionally starting from an image URL saved from the feed.
    pub fn for_selection(selected: Option<Post>, prefill: Option<String>) -> Self {
        match selected {
            Some(post) => PanelMode::Edit(post),
            None => PanelMode::Create { prefill },
        }
    }

    pub fn title(&self) -> String {
        match self {
            PanelMode::Create { .. } => "New post".to_string(),
            PanelMode::Edit(post) => format!("Edit post {}", post.id),
            PanelMode::Delete(post) => format!("Delete post {}", post.id),
        }
    }

    pub fn post(&self) -> Option<&Post> {
        match self {
            PanelMode::Create { .. } => None,
            PanelMode::Edit(post) | PanelMode::Delete(post) => Some(post),
        }
    }

    /// Form contents when the panel opens in this mode.
    pub fn initial_draft(&self) -> PostDraft {
        match self {
            PanelMode::Create { prefill } => PostDraft {
                image_url: prefill.clone().unwrap_or_default(),
                ..Default::default()
            },
            PanelMode::Edit(post) | PanelMode::Delete(post) => PostDraft::from_post(post),
        }
    }

    /// Edit -> Delete confirmation. Other modes are unchanged.
    pub fn request_delete(self) -> Self {
        match self {
            PanelMode::Edit(post) => PanelMode::Delete(post),
            other => other,
        }
    }

    /// Delete -> Edit, Edit -> Create.
    pub fn cancel(self) -> Self {
        match self {
            PanelMode::Delete(post) => PanelMode::Edit(post),
            _ => PanelMode::Create { prefill: None },
        }
    }
}

/// Raw form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub image_url: String,
    pub description: String,
    pub tags: String,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl PostDraft {
    pub fn from_post(post: &Post) -> Self {
        Self {
            image_url: post.image_url.clone(),
            description: post.description.clone().unwrap_or_default(),
            tags: post.tags.clone().unwrap_or_default(),
        }
    }

    /// Trimmed request body, or the reason it cannot be sent.
    pub fn validate(&self) -> Result<NewPost, ValidationError> {
        let image_url = self.image_url.trim();
        if image_url.is_empty() {
            return Err(ValidationError::MissingImageUrl);
        }
        Ok(NewPost {
            image_url: image_url.to_string(),
            description: non_empty(&self.description),
            tags: non_empty(&self.tags),
        })
    }

    /// Fields of this draft that differ from `post`.
    pub fn changes_from(&self, post: &Post) -> Result<PostPatch, ValidationError> {
        let body = self.validate()?;
        let mut patch = PostPatch::default();
        if body.image_url != post.image_url {
            patch.image_url = Some(body.image_url);
        }
        if body.description.as_deref().unwrap_or("") != post.description.as_deref().unwrap_or("") {
            patch.description = Some(body.description);
        }
        if body.tags.as_deref().unwrap_or("") != post.tags.as_deref().unwrap_or("") {
            patch.tags = Some(body.tags);
        }
        Ok(patch)
    }
}

/// How an edit is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditStrategy {
    /// `PATCH` with only the changed fields.
    #[default]
    Patch,
    /// `PUT` with every field; empty ones are reset.
    Replace,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Created(Post),
    Updated(Post),
    /// The edit changed nothing, so no request was made.
    Unchanged,
    Deleted(PostId),
}

/// Send the panel's action to the gateway.
///
/// Validation and ownership are checked before any request goes out.
pub async fn submit<G: PostGateway>(
    gateway: &G,
    identity: &Identity,
    mode: &PanelMode,
    draft: &PostDraft,
    strategy: EditStrategy,
) -> Result<Submitted, ComposeError> {
    if let Some(post) = mode.post() {
        if !post.is_owned_by(identity) {
            return Err(ComposeError::NotOwner(post.id));
        }
    }

    match mode {
        PanelMode::Create { .. } => {
            let body = draft.validate()?;
            let created = gateway.create_post(&body).await?;
            info!(id = %created.id, user = %identity, "Post created");
            Ok(Submitted::Created(created))
        }
        PanelMode::Edit(post) => match strategy {
            EditStrategy::Patch => {
                let patch = draft.changes_from(post)?;
                if patch.is_empty() {
                    debug!(id = %post.id, "No changes to send");
                    return Ok(Submitted::Unchanged);
                }
                let updated = gateway.update_post(post.id, &patch).await?;
                info!(id = %post.id, "Post updated");
                Ok(Submitted::Updated(updated))
            }
            EditStrategy::Replace => {
                let body = draft.validate()?;
                let replaced = gateway.replace_post(post.id, &body).await?;
                info!(id = %post.id, "Post replaced");
                Ok(Submitted::Updated(replaced))
            }
        },
        PanelMode::Delete(post) => {
            gateway.delete_post(post.id).await?;
            info!(id = %post.id, "Post deleted");
            Ok(Submitted::Deleted(post.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::{Call, FakeGateway};

    fn owned_post() -> Post {
        Post {
            id: PostId(8),
            user_id: "lucho".to_string(),
            image_url: "https://images.unsplash.com/photo-1501785888041-af3ef285b470".to_string(),
            description: Some("Road trip".to_string()),
            tags: Some("travel,road,adventure".to_string()),
            created_at: "2026-10-01T00:00:00".to_string(),
            updated_at: "2026-10-01T00:00:00".to_string(),
        }
    }

    fn lucho() -> Identity {
        Identity::new("lucho").unwrap()
    }

    #[test]
    fn test_mode_for_selection() {
        assert_eq!(
            PanelMode::for_selection(None, Some("https://e.com/a.jpg".to_string())),
            PanelMode::Create {
                prefill: Some("https://e.com/a.jpg".to_string())
            }
        );
        assert_eq!(
            PanelMode::for_selection(Some(owned_post()), Some("ignored".to_string())),
            PanelMode::Edit(owned_post())
        );
    }

    #[test]
    fn test_mode_transitions() {
        let mode = PanelMode::Edit(owned_post()).request_delete();
        assert_eq!(mode, PanelMode::Delete(owned_post()));
        let mode = mode.cancel();
        assert_eq!(mode, PanelMode::Edit(owned_post()));
        assert_eq!(mode.cancel(), PanelMode::Create { prefill: None });

        let create = PanelMode::Create { prefill: None };
        assert_eq!(create.clone().request_delete(), create);
    }

    #[test]
    fn test_initial_draft() {
        let draft = PanelMode::Create {
            prefill: Some("https://e.com/a.jpg".to_string()),
        }
        .initial_draft();
        assert_eq!(draft.image_url, "https://e.com/a.jpg");
        assert!(draft.description.is_empty());

        let draft = PanelMode::Edit(owned_post()).initial_draft();
        assert_eq!(draft.description, "Road trip");
        assert_eq!(draft.tags, "travel,road,adventure");
    }

    #[test]
    fn test_validate_trims_and_drops_empty_optionals() {
        let draft = PostDraft {
            image_url: "  https://e.com/a.jpg ".to_string(),
            description: "   ".to_string(),
            tags: " beach, sunset ".to_string(),
        };
        assert_eq!(
            draft.validate().unwrap(),
            NewPost {
                image_url: "https://e.com/a.jpg".to_string(),
                description: None,
                tags: Some("beach, sunset".to_string()),
            }
        );
    }

    #[test]
    fn test_validate_requires_image_url() {
        assert_eq!(
            PostDraft::default().validate(),
            Err(ValidationError::MissingImageUrl)
        );
        let draft = PostDraft {
            image_url: " \t ".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.validate(), Err(ValidationError::MissingImageUrl));
    }

    #[test]
    fn test_validate_accepts_any_non_empty_image_reference() {
        for url in ["/uploads/beach.jpg", "images.example.com/a.png", "data:image/png;base64,iVBOR"] {
            let draft = PostDraft {
                image_url: url.to_string(),
                ..Default::default()
            };
            assert_eq!(draft.validate().unwrap().image_url, url);
        }
    }

    #[test]
    fn test_changes_from_only_reports_differences() {
        let post = owned_post();
        let mut draft = PostDraft::from_post(&post);
        assert!(draft.changes_from(&post).unwrap().is_empty());

        draft.description = String::new();
        draft.tags = "travel".to_string();
        let patch = draft.changes_from(&post).unwrap();
        assert_eq!(
            patch,
            PostPatch {
                image_url: None,
                description: Some(None),
                tags: Some(Some("travel".to_string())),
            }
        );
    }

    #[tokio::test]
    async fn test_submit_create_validates_before_request() {
        let gateway = FakeGateway::new().with_identity(lucho());
        let result = submit(
            &gateway,
            &lucho(),
            &PanelMode::Create { prefill: None },
            &PostDraft::default(),
            EditStrategy::Patch,
        )
        .await;

        assert!(matches!(
            result,
            Err(ComposeError::Invalid(ValidationError::MissingImageUrl))
        ));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_create() {
        let gateway = FakeGateway::new().with_identity(lucho());
        let draft = PostDraft {
            image_url: "https://e.com/new.jpg".to_string(),
            ..Default::default()
        };
        let result = submit(
            &gateway,
            &lucho(),
            &PanelMode::Create { prefill: None },
            &draft,
            EditStrategy::Patch,
        )
        .await
        .unwrap();

        match result {
            Submitted::Created(post) => {
                assert_eq!(post.user_id, "lucho");
                assert_eq!(post.image_url, "https://e.com/new.jpg");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_patch_sends_only_changes() {
        let gateway = FakeGateway::new().with_identity(lucho());
        gateway.seed(vec![owned_post()]);
        let mode = PanelMode::Edit(owned_post());
        let mut draft = mode.initial_draft();
        draft.description = "Road trip 2026".to_string();

        let result = submit(&gateway, &lucho(), &mode, &draft, EditStrategy::Patch)
            .await
            .unwrap();

        let expected_patch = PostPatch {
            description: Some(Some("Road trip 2026".to_string())),
            ..Default::default()
        };
        assert_eq!(gateway.calls(), vec![Call::Update(PostId(8), expected_patch)]);
        match result {
            Submitted::Updated(post) => {
                assert_eq!(post.description.as_deref(), Some("Road trip 2026"));
                assert_eq!(post.tags.as_deref(), Some("travel,road,adventure"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_patch_without_changes_sends_nothing() {
        let gateway = FakeGateway::new().with_identity(lucho());
        let mode = PanelMode::Edit(owned_post());
        let result = submit(&gateway, &lucho(), &mode, &mode.initial_draft(), EditStrategy::Patch)
            .await
            .unwrap();
        assert_eq!(result, Submitted::Unchanged);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_replace_resets_omitted_fields() {
        let gateway = FakeGateway::new().with_identity(lucho());
        gateway.seed(vec![owned_post()]);
        let mode = PanelMode::Edit(owned_post());
        let draft = PostDraft {
            image_url: owned_post().image_url,
            ..Default::default()
        };

        let result = submit(&gateway, &lucho(), &mode, &draft, EditStrategy::Replace)
            .await
            .unwrap();

        match result {
            Submitted::Updated(post) => {
                assert!(post.description.is_none());
                assert!(post.tags.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_delete() {
        let gateway = FakeGateway::new().with_identity(lucho());
        gateway.seed(vec![owned_post()]);
        let mode = PanelMode::Delete(owned_post());

        let result = submit(&gateway, &lucho(), &mode, &PostDraft::default(), EditStrategy::Patch)
            .await
            .unwrap();

        assert_eq!(result, Submitted::Deleted(PostId(8)));
        assert_eq!(gateway.calls(), vec![Call::Delete(PostId(8))]);
    }

    #[tokio::test]
    async fn test_submit_rejects_other_users_post() {
        let gateway = FakeGateway::new();
        let emiliano = Identity::new("emiliano").unwrap();
        let mode = PanelMode::Delete(owned_post());

        let result = submit(&gateway, &emiliano, &mode, &PostDraft::default(), EditStrategy::Patch).await;

        assert!(matches!(result, Err(ComposeError::NotOwner(PostId(8)))));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_surfaces_api_error() {
        let gateway = FakeGateway::new().with_identity(lucho());
        // Post is not seeded, so the fake answers with the server's 404 text
        let mode = PanelMode::Delete(owned_post());

        let result = submit(&gateway, &lucho(), &mode, &PostDraft::default(), EditStrategy::Patch).await;

        match result {
            Err(ComposeError::Api(e)) => assert_eq!(e.to_string(), "Post no encontrado"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
