//! Pinboard - a command-line client for the pinboard image feed.
//!
//! The feed is served from a local cache when the API is unreachable, and
//! brought up to date with a delta fetch when it is not.

mod app;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pinboard_core::config::Config;
use pinboard_core::{Identity, PostId};

use app::{App, DraftArgs};

/// Environment variable naming the user when `--user` is not given.
const USER_ENV: &str = "PINBOARD_USER";

#[derive(Parser, Debug)]
#[command(name = "pinboard")]
#[command(about = "Browse and share images on a pinboard feed")]
#[command(version)]
struct Args {
    /// User to act as (default: $PINBOARD_USER, else prompt)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// API base URL (default: $PINBOARD_API_URL, config, or http://localhost:8000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to config file (default: $XDG_CONFIG_HOME/pinboard/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print JSON instead of cards
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync and show the feed (default)
    Feed {
        /// Also show discovery images
        #[arg(short, long)]
        discover: bool,
    },
    /// Show images from the discovery feed
    Discover {
        #[arg(short = 'n', long)]
        count: Option<u32>,
    },
    /// Show a single post
    Show { id: PostId },
    /// Create a post
    Create {
        #[arg(long)]
        image_url: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Edit one of your posts; only changed fields are sent
    Edit {
        id: PostId,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        tags: Option<String>,
        /// Replace the whole post; fields not given are cleared
        #[arg(long)]
        replace: bool,
    },
    /// Delete one of your posts
    Delete {
        id: PostId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Check the API's health
    Health,
    /// Remove the cached feed and sync cursor
    ClearCache,
}

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the log file and must live until exit.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            Ok(None)
        }
    }
}

/// `--user`, then `$PINBOARD_USER`, then ask until a usable name is given.
fn resolve_identity(flag: Option<String>) -> Result<Identity> {
    if let Some(raw) = flag.or_else(|| std::env::var(USER_ENV).ok()) {
        return Ok(Identity::new(&raw)?);
    }

    loop {
        print!("User name: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            anyhow::bail!("A user name is required");
        }
        match Identity::new(&input) {
            Ok(identity) => return Ok(identity),
            Err(e) => eprintln!("{}", e),
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        config.override_api_base_url(url);
    }

    let identity = resolve_identity(args.user)?;
    let app = App::new(config, identity, args.json)?;

    match args.command.unwrap_or(Command::Feed { discover: false }) {
        Command::Feed { discover } => app.feed(discover).await,
        Command::Discover { count } => app.discover(count).await,
        Command::Show { id } => app.show(id).await,
        Command::Create {
            image_url,
            description,
            tags,
        } => {
            app.create(DraftArgs {
                image_url,
                description,
                tags,
            })
            .await
        }
        Command::Edit {
            id,
            image_url,
            description,
            tags,
            replace,
        } => {
            let fields = DraftArgs {
                image_url,
                description,
                tags,
            };
            app.edit(id, fields, replace).await
        }
        Command::Delete { id, yes } => app.delete(id, yes).await,
        Command::Health => app.health().await,
        Command::ClearCache => app.clear_cache(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let _guard = match init_tracing(args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: could not open log file: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("pinboard starting");

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = app::failure_hint(&e) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}
