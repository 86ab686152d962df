//! Data models for the pinboard API.
//!
//! - `Post`, `PostId`: image posts, the unit of the cached collection
//! - `PostPage`, `NewPost`, `PostPatch`: list, create/replace and partial update bodies
//! - `DiscoveryImage`, `DiscoveryPreview`: third-party images for the discovery feed
//! - `HealthStatus`: service health check

pub mod discovery;
pub mod health;
pub mod post;

pub use discovery::{DiscoveryImage, DiscoveryPreview, DISCOVERY_OWNER};
pub use health::HealthStatus;
pub use post::{NewPost, Post, PostId, PostPage, PostPatch};
