//! Command handlers. Each one prints its result and reports whether the
//! command succeeded.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use pinboard_core::compose::{self, ComposeError, EditStrategy, PanelMode, PostDraft, Submitted};
use pinboard_core::config::Config;
use pinboard_core::store::{FileBackend, KeyValueBackend, MemoryBackend};
use pinboard_core::{
    ApiClient, ApiError, Identity, PostCache, PostGateway, PostId, SyncReport, Synchronizer,
};

use crate::render;

/// Storage behind the post cache: the per-origin directory, or memory when
/// that directory cannot be used.
pub type Backend = Arc<dyn KeyValueBackend>;

/// Field overrides given on the command line for `create` and `edit`.
#[derive(Debug, Default)]
pub struct DraftArgs {
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

impl DraftArgs {
    fn apply(self, draft: &mut PostDraft) {
        if let Some(url) = self.image_url {
            draft.image_url = url;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(tags) = self.tags {
            draft.tags = tags;
        }
    }
}

pub struct App {
    config: Config,
    identity: Identity,
    api: ApiClient,
    sync: Synchronizer<ApiClient, Backend>,
    json: bool,
}

impl App {
    pub fn new(config: Config, identity: Identity, json: bool) -> Result<Self> {
        let base_url = config.api_base_url();
        let api = ApiClient::new(&base_url, identity.clone())?;
        let cache = PostCache::new(open_backend(&config));
        let sync = Synchronizer::new(api.with_identity(identity.clone()), cache);
        info!(api = %base_url, user = %identity, "Client ready");

        Ok(Self {
            config,
            identity,
            api,
            sync,
            json,
        })
    }

    /// Synchronize and print the feed, optionally followed by discovery images
    /// fetched concurrently.
    pub async fn feed(&self, with_discovery: bool) -> Result<bool> {
        let report = if with_discovery {
            let count = self.config.discovery_count();
            let (report, discovery) = futures::join!(
                self.sync.synchronize(&self.identity),
                self.api.list_discovery_images(count)
            );
            self.print_report(&report)?;
            match discovery {
                Ok(images) if !self.json => {
                    println!("\n-- Discover --\n");
                    for image in &images {
                        println!("{}\n", render::discovery_card(image));
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Discovery images unavailable");
                    eprintln!("Warning: discovery unavailable: {:#}", e);
                }
            }
            report
        } else {
            let report = self.sync.synchronize(&self.identity).await;
            self.print_report(&report)?;
            report
        };
        Ok(!report.is_error())
    }

    pub async fn discover(&self, count: Option<u32>) -> Result<bool> {
        let count = count.unwrap_or_else(|| self.config.discovery_count());
        let images = self
            .api
            .list_discovery_images(count)
            .await
            .context("Failed to load discovery images")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&images)?);
        } else if images.is_empty() {
            println!("Nothing to discover right now.");
        } else {
            for image in &images {
                println!("{}\n", render::discovery_card(image));
            }
        }
        Ok(true)
    }

    pub async fn show(&self, id: PostId) -> Result<bool> {
        let post = self.api.get_post(id).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&post)?);
        } else {
            println!("{}", render::post_detail(&post, &self.identity));
        }
        Ok(true)
    }

    pub async fn create(&self, fields: DraftArgs) -> Result<bool> {
        let mode = PanelMode::for_selection(None, fields.image_url.clone());
        let mut draft = mode.initial_draft();
        fields.apply(&mut draft);
        self.submit(mode, draft, EditStrategy::Patch).await
    }

    pub async fn edit(&self, id: PostId, fields: DraftArgs, replace: bool) -> Result<bool> {
        let post = self.api.get_post(id).await?;
        let mode = PanelMode::for_selection(Some(post), None);
        let mut draft = mode.initial_draft();
        fields.apply(&mut draft);
        let strategy = if replace {
            EditStrategy::Replace
        } else {
            EditStrategy::Patch
        };
        self.submit(mode, draft, strategy).await
    }

    pub async fn delete(&self, id: PostId, assume_yes: bool) -> Result<bool> {
        let post = self.api.get_post(id).await?;
        let mode = PanelMode::for_selection(Some(post), None).request_delete();

        if !assume_yes && !confirm(&format!("{}? [y/N]: ", mode.title()))? {
            println!("Cancelled.");
            return Ok(true);
        }
        let draft = mode.initial_draft();
        self.submit(mode, draft, EditStrategy::Patch).await
    }

    pub async fn health(&self) -> Result<bool> {
        let status = self.api.health().await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            println!("{}", render::health(&status));
        }
        Ok(status.is_healthy())
    }

    pub fn clear_cache(&self) -> Result<bool> {
        self.sync.cache().clear();
        println!("Cache cleared.");
        Ok(true)
    }

    async fn submit(&self, mode: PanelMode, draft: PostDraft, strategy: EditStrategy) -> Result<bool> {
        let done = match compose::submit(&self.api, &self.identity, &mode, &draft, strategy).await {
            Ok(done) => done,
            Err(ComposeError::Api(e)) => return Err(e),
            Err(e) => {
                eprintln!("{}", e);
                return Ok(false);
            }
        };

        match done {
            Submitted::Unchanged => {
                println!("Nothing changed.");
                return Ok(true);
            }
            Submitted::Created(post) => println!("Created post {}.", post.id),
            Submitted::Updated(post) => println!("Updated post {}.", post.id),
            Submitted::Deleted(id) => println!("Deleted post {}.", id),
        }

        let report = self.sync.refresh_after_write(&self.identity).await;
        println!();
        self.print_report(&report)?;
        Ok(true)
    }

    fn print_report(&self, report: &SyncReport) -> Result<()> {
        if let Some(message) = &report.message {
            let label = if report.is_error() { "Error" } else { "Warning" };
            eprintln!("{}: {}", label, message);
        }
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report.posts)?);
        } else {
            println!("{}\n", render::feed(report, &self.identity));
            println!(
                "{}",
                render::status_line(
                    report,
                    &self.identity,
                    &self.sync.cache().last_synced_display()
                )
            );
        }
        Ok(())
    }
}

fn open_backend(config: &Config) -> Backend {
    let dir = match config.cache_dir() {
        Ok(dir) => dir,
        Err(e) => {
            warn!(error = %e, "No cache directory, caching in memory");
            return Arc::new(MemoryBackend::new());
        }
    };
    match FileBackend::new(dir) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            warn!(error = %e, "Cache directory unusable, caching in memory");
            Arc::new(MemoryBackend::new())
        }
    }
}

/// Follow-up advice for a failed command, keyed by the HTTP status behind it.
pub fn failure_hint(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<ApiError>()?.status()? {
        403 => Some("Only the owner of a post can change it."),
        404 => Some("The post may have been deleted. Run `pinboard clear-cache` to reload the feed."),
        429 => Some("The server is busy. Try again in a moment."),
        500..=599 => Some("The server is having trouble. Cached posts are still available with `pinboard feed`."),
        _ => None,
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
