use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codesearch::config::{Config, DEFAULT_CONFIG_PATH};
use codesearch::db::Db;
use codesearch::embedder::hash::HashEmbedder;
use codesearch::indexer::{Language, chunk_source};
use codesearch::search::QueryMode;
use codesearch::service::SearchService;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Syntax-aware code search over local source trees.
///
/// Results are printed to stdout as JSON; logs go to stderr.
#[derive(Parser)]
#[command(name = "codesearch", version, about)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Store(StoreCommand),
    /// Print the chunks of a single source file
    Split { file: PathBuf },
}

/// Commands that work against the database.
#[derive(Subcommand)]
enum StoreCommand {
    /// Create, delete or list collections
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Index the source files under a path into a collection
    Index {
        collection: String,
        path: PathBuf,
        /// Re-index files even if they are unchanged
        #[arg(long)]
        force: bool,
    },
    /// Search a collection
    Search {
        collection: String,
        query: String,
        /// default|dense, sparse or hybrid (defaults to search.default_mode)
        #[arg(short, long)]
        mode: Option<QueryMode>,
    },
}

#[derive(Subcommand)]
enum CollectionAction {
    Create { name: String },
    Delete { name: String },
    List,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn split_file(config: &Config, file: &Path) -> Result<()> {
    let language = Language::from_path(file)
        .with_context(|| format!("unsupported file type: {}", file.display()))?;
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let chunks = chunk_source(
        language,
        &source,
        config.splitter_config()?,
        config.chunking.merge_min_length,
    )?;
    print_json(&json!({
        "file": file.display().to_string(),
        "language": language.name(),
        "chunks": chunks,
    }))
}

async fn run(command: StoreCommand, config: Config) -> Result<()> {
    let db = Db::open(&config.db_path, config.model.dimensions)
        .with_context(|| format!("failed to open database {}", config.db_path))?;
    let embedder = Arc::new(HashEmbedder::new(config.model.dimensions));
    info!(
        "Embedder: {} ({} dimensions)",
        config.model.name, config.model.dimensions
    );
    let service = SearchService::new(db, embedder, config)?;

    match command {
        StoreCommand::Collection { action } => match action {
            CollectionAction::Create { name } => {
                let id = service.create_collection(&name).await?;
                print_json(&json!({ "id": id, "name": name }))
            }
            CollectionAction::Delete { name } => {
                service.delete_collection(&name).await?;
                print_json(&json!({ "deleted": name }))
            }
            CollectionAction::List => print_json(&service.list_collections().await?),
        },
        StoreCommand::Index {
            collection,
            path,
            force,
        } => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
            spinner.set_message(format!("Indexing {} into {collection}", path.display()));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let report = service.index_collection(&collection, &path, force).await;
            spinner.finish_and_clear();
            print_json(&report?)
        }
        StoreCommand::Search {
            collection,
            query,
            mode,
        } => {
            let mode = mode.unwrap_or(service.config().search.default_mode);
            let hits = service.search(&collection, &query, mode).await?;
            print_json(&hits)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    config.validate()?;

    match cli.command {
        // Splitting needs no store.
        Command::Split { file } => split_file(&config, &file),
        Command::Store(command) => run(command, config).await,
    }
}
