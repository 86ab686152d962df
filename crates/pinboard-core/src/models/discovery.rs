use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Owner shown on discovery previews.
pub const DISCOVERY_OWNER: &str = "unsplash";

/// A third-party image from `GET /discover`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DiscoveryImage {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub thumb_url: Option<String>,
    #[serde(default)]
    pub alt_description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
}

/// Post-shaped card for rendering a discovery image next to real posts.
///
/// Previews are display-only; they never enter the cached collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryPreview {
    pub id: String,
    pub user_id: String,
    pub image_url: String,
    pub description: String,
    pub created_at: String,
}

impl DiscoveryImage {
    pub fn to_preview(&self) -> DiscoveryPreview {
        DiscoveryPreview {
            id: format!("discover_{}", self.id),
            user_id: DISCOVERY_OWNER.to_string(),
            image_url: self.url.clone(),
            description: self.alt_description.clone().unwrap_or_default(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn credit(&self) -> Option<String> {
        self.author.as_ref().map(|a| format!("Photo by {}", a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_from_discovery_image() {
        let json = r#"{"id": "abc123", "url": "https://images.unsplash.com/photo-1", "thumb_url": "https://images.unsplash.com/photo-1?w=200", "alt_description": null, "author": "Ana", "author_url": "https://unsplash.com/@ana"}"#;
        let image: DiscoveryImage = serde_json::from_str(json).unwrap();

        let preview = image.to_preview();
        assert_eq!(preview.id, "discover_abc123");
        assert_eq!(preview.user_id, "unsplash");
        assert_eq!(preview.image_url, "https://images.unsplash.com/photo-1");
        assert_eq!(preview.description, "");
        assert_eq!(image.credit().as_deref(), Some("Photo by Ana"));
    }

    #[test]
    fn test_minimal_discovery_image() {
        let image: DiscoveryImage =
            serde_json::from_str(r#"{"id": "x", "url": "https://e.com/x.jpg"}"#).unwrap();
        assert!(image.alt_description.is_none());
        assert!(image.credit().is_none());
    }
}
