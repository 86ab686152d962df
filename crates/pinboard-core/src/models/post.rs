use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::Identity;

/// Server-assigned post identifier. Equality on this value is the dedup key
/// for the local collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PostId)
    }
}

/// An image post as returned by the API.
///
/// Posts are never edited in place: an update produces a new value from the
/// server which replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Post {
    pub id: PostId,
    pub user_id: String,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Comma separated free text, kept exactly as the server sent it.
    #[serde(default)]
    pub tags: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Post {
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        self.user_id == identity.as_str()
    }

    /// Split the tag string for display.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn display_description(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "(no description)",
        }
    }
}

/// One page of `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PostPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Body of a create (`POST`) or full replacement (`PUT`).
///
/// Optional fields serialize as `null` so a replacement resets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewPost {
    pub image_url: String,
    pub description: Option<String>,
    pub tags: Option<String>,
}

/// Body of a partial update (`PATCH`). Only the fields that are set are sent.
///
/// The inner `Option` distinguishes "clear this field" (`Some(None)`) from
/// "leave it alone" (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Option<String>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.image_url.is_none() && self.description.is_none() && self.tags.is_none()
    }
}
