//! Plain-text rendering of posts, discovery previews and status.

use pinboard_core::models::HealthStatus;
use pinboard_core::sync::FetchMode;
use pinboard_core::utils::{format_date, truncate_string};
use pinboard_core::{DiscoveryImage, Identity, Post, SyncReport, SyncState};

/// Longest description shown on a feed card.
const DESCRIPTION_WIDTH: usize = 72;

pub fn post_card(post: &Post, identity: &Identity) -> String {
    let owner = if post.is_owned_by(identity) {
        format!("{} (you)", post.user_id)
    } else {
        post.user_id.clone()
    };

    let mut lines = vec![
        format!("#{}  {}  {}", post.id, owner, format_date(&post.created_at)),
        format!("  {}", post.image_url),
        format!("  {}", truncate_string(post.display_description(), DESCRIPTION_WIDTH)),
    ];
    let tags = post.tag_list();
    if !tags.is_empty() {
        let tags: Vec<String> = tags.iter().map(|t| format!("#{}", t)).collect();
        lines.push(format!("  {}", tags.join(" ")));
    }
    lines.join("\n")
}

/// Full detail view used by `show`.
pub fn post_detail(post: &Post, identity: &Identity) -> String {
    let mut out = post_card(post, identity);
    out.push_str(&format!("\n  updated {}", format_date(&post.updated_at)));
    if let Some(description) = post.description.as_deref() {
        if description.chars().count() > DESCRIPTION_WIDTH {
            out.push_str(&format!("\n\n{}", description));
        }
    }
    out
}

pub fn discovery_card(image: &DiscoveryImage) -> String {
    let preview = image.to_preview();
    let mut lines = vec![
        format!("{}  {}", preview.id, preview.user_id),
        format!("  {}", preview.image_url),
    ];
    if !preview.description.is_empty() {
        lines.push(format!("  {}", truncate_string(&preview.description, DESCRIPTION_WIDTH)));
    }
    if let Some(credit) = image.credit() {
        lines.push(format!("  {}", credit));
    }
    lines.join("\n")
}

pub fn feed(report: &SyncReport, identity: &Identity) -> String {
    if report.posts.is_empty() {
        return "No posts yet.".to_string();
    }
    report
        .posts
        .iter()
        .map(|p| post_card(p, identity))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Avatar-style marker for the active user.
pub fn user_badge(identity: &Identity) -> String {
    if identity.is_anonymous() {
        "guest".to_string()
    } else {
        format!("[{}] {}", identity.initial(), identity)
    }
}

/// One-line summary printed under the feed.
pub fn status_line(report: &SyncReport, identity: &Identity, last_synced: &str) -> String {
    let state = match report.state {
        SyncState::Success => match (report.mode, report.added) {
            (Some(FetchMode::Full), _) => "synced".to_string(),
            (_, 0) => "up to date".to_string(),
            (_, n) => format!("{} new", n),
        },
        SyncState::Degraded => "offline, showing cached posts".to_string(),
        SyncState::Failed => "unavailable".to_string(),
        SyncState::Idle | SyncState::Loading => "not synced".to_string(),
    };
    format!(
        "{} | {} posts | {} | last sync {}",
        user_badge(identity),
        report.posts.len(),
        state,
        last_synced
    )
}

pub fn health(status: &HealthStatus) -> String {
    let flag = |ok: bool| if ok { "ok" } else { "down" };
    format!(
        "status: {}\ndatabase: {}\nunsplash: {}\nchecked: {}",
        status.status,
        flag(status.database),
        flag(status.unsplash_api),
        status.timestamp
    )
}
