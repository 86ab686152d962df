//! Core library for pinboard: a client for an image-sharing feed that keeps
//! a local read-through cache of posts.
//!
//! The pieces, leaves first:
//! - [`store`]: fail-open key-value storage with JSON (de)serialization
//! - [`cache`]: the cached post collection, the sync cursor, and merging
//! - [`api`]: the remote gateway contract and its HTTP client
//! - [`sync`]: full/delta synchronization with fallback to the cache
//! - [`compose`]: create/edit/delete panel logic
//! - [`session`], [`config`], [`models`], [`utils`]

pub mod api;
pub mod cache;
pub mod compose;
pub mod config;
pub mod models;
pub mod session;
pub mod store;
pub mod sync;
pub mod utils;

pub use api::{ApiClient, ApiError, PostGateway};
pub use cache::{merge_posts, PostCache, SyncCursor};
pub use models::{DiscoveryImage, Post, PostId};
pub use session::Identity;
pub use sync::{SyncReport, SyncState, Synchronizer};
