//! poststore CLI - drive the post store from the command line
//!
//! Every subcommand maps onto one store operation and prints JSON:
//! - `create` / `edit` / `delete` write through the primary database
//! - `get` / `page` / `search` / `etag` read through the replica when set
//! - `migrate` and `channel` prepare the schema and seed channels

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use poststore_store::PostStore;
use tracing::info;

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "poststore",
    author,
    version,
    about = "Persist, thread, page and search chat posts",
    long_about = "Post store command line. Posts are never edited in place: edits keep the id \
                  and leave a soft-deleted copy of the old content behind."
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.poststore/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Primary database URL
    #[arg(long, global = true, value_name = "URL")]
    database_url: Option<String>,

    /// Read replica URL
    #[arg(long, global = true, value_name = "URL")]
    replica_url: Option<String>,

    /// Maximum connections per pool
    #[arg(long, global = true)]
    max_connections: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create tables and indexes
    Migrate,
    /// Seed channels and memberships (add, join)
    Channel(commands::ChannelArgs),
    /// Create a post or reply
    Create(commands::CreateArgs),
    /// Edit a post's message, keeping its id
    Edit(commands::EditArgs),
    /// Soft-delete a post and its replies
    Delete(commands::DeleteArgs),
    /// Show the thread containing a post
    Get(commands::GetArgs),
    /// Show a page of a channel with thread context
    Page(commands::PageArgs),
    /// Full-text or hashtag search
    Search(commands::SearchArgs),
    /// Print the channel's change token
    Etag(commands::EtagArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    config::load_env_files();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    let mut store_config = config::load(
        cli.config.as_deref(),
        config::Overrides {
            database_url: cli.database_url,
            replica_url: cli.replica_url,
            max_connections: cli.max_connections,
        },
    )?;

    if let Commands::Migrate = cli.command {
        store_config.migrate = true;
    }

    let store = PostStore::connect(&store_config)
        .await
        .context("Failed to connect to the post store")?;

    match cli.command {
        Commands::Migrate => {
            info!("schema is up to date");
            commands::print_field("migrated", true)?
        }
        Commands::Channel(args) => commands::run_channel(&store, args).await?,
        Commands::Create(args) => commands::run_create(&store, args).await?,
        Commands::Edit(args) => commands::run_edit(&store, args).await?,
        Commands::Delete(args) => commands::run_delete(&store, args).await?,
        Commands::Get(args) => commands::run_get(&store, args).await?,
        Commands::Page(args) => commands::run_page(&store, args).await?,
        Commands::Search(args) => commands::run_search(&store, args).await?,
        Commands::Etag(args) => commands::run_etag(&store, args).await?,
    }
    Ok(())
}
