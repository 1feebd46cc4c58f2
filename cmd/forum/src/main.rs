//! # forum
//!
//! Command-line front end for the forum content store. Assembles the storage
//! backing from configuration, seeds it, and runs one command. Results go to
//! stdout as JSON; logs go to stderr.

mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use configs::{LogFormat, LogSettings, Settings, StorageBackend, StorageSettings};
use domains::{KvStore, SortMode};
use services::{prepare_attachments, sort_posts, ForumStore, PostDraft, Upload};
use storage_adapters::{FileKvStore, MemoryKvStore};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn init_tracing(log: &LogSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn open_backing(storage: &StorageSettings) -> anyhow::Result<Arc<dyn KvStore>> {
    let backing: Arc<dyn KvStore> = match storage.backend {
        StorageBackend::Memory => Arc::new(match storage.quota_bytes {
            Some(limit) => MemoryKvStore::with_quota(limit),
            None => MemoryKvStore::new(),
        }),
        StorageBackend::File => Arc::new(
            FileKvStore::open(&storage.data_dir)
                .await
                .with_context(|| format!("opening {}", storage.data_dir.display()))?,
        ),
    };
    Ok(backing)
}

async fn read_uploads(paths: &[std::path::PathBuf]) -> anyhow::Result<Vec<Upload>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading attachment {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        uploads.push(Upload::new(name, data));
    }
    Ok(uploads)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(store: &ForumStore, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Seed => {
            let seeded = store.seed_if_empty().await?;
            print_json(&serde_json::json!({ "seeded": seeded }))
        }
        Command::List {
            sort,
            author,
            category,
        } => {
            let posts = match (author, category) {
                (Some(author), _) => store.posts_by_author(&author).await,
                (None, Some(category)) => store.posts_in_category(&category).await,
                (None, None) => store.get_all_posts().await,
            };
            let mode: SortMode = sort.parse()?;
            print_json(&sort_posts(&posts, &mode))
        }
        Command::Show { id } => print_json(&store.require_post(&id).await?),
        Command::Post {
            title,
            content,
            author,
            community,
            attachments,
        } => {
            let uploads = read_uploads(&attachments).await?;
            let draft = PostDraft {
                title,
                content,
                author_username: author,
                community,
                attachments: prepare_attachments(uploads),
            };
            let id = store.publish(draft).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        Command::Vote { id, delta } => {
            let votes = store.vote_post(&id, delta).await?;
            print_json(&serde_json::json!({ "id": id, "votes": votes }))
        }
        Command::Comment {
            id,
            content,
            author,
        } => {
            let comment_id = store
                .add_comment(&id, &content, author.as_deref().unwrap_or_default())
                .await?;
            print_json(&serde_json::json!({ "id": comment_id, "postId": id }))
        }
        Command::Comments { id } => print_json(&store.get_comments(&id).await),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env_file = configs::load_dotenv(cli.env_file.as_deref());
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        settings.storage.data_dir = data_dir;
    }
    init_tracing(&settings.log);
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let backing = open_backing(&settings.storage).await?;
    let store = ForumStore::new(backing);
    if settings.seed.on_start {
        store.seed_if_empty().await?;
    }

    tracing::debug!(command = ?cli.command, "running command");
    run(&store, cli.command).await
}
