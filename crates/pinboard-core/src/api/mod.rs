//! Remote data gateway.
//!
//! `PostGateway` is the contract the sync and compose code depend on;
//! `ApiClient` implements it over the pinboard REST API.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::{ApiClient, DEFAULT_API_BASE_URL};
pub use error::ApiError;
pub use gateway::PostGateway;
