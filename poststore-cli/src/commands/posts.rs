//! Post operations: create, edit, delete, get, page, search, etag.
//!
//! ```bash
//! poststore create --channel $C --user $U --message "ship it #release"
//! poststore page $C --limit 20 | jq '.order'
//! poststore search --team $T --user $U --hashtags "#release"
//! ```

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use poststore_core::{now_millis, parse_hashtags, Post};
use poststore_store::PostStore;
use tracing::warn;

use super::{print_field, print_json};

#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Channel to post in
    #[arg(long)]
    pub channel: String,

    /// Author user id
    #[arg(long)]
    pub user: String,

    /// Message text; hashtags are extracted from it
    #[arg(long, short)]
    pub message: String,

    /// Thread root when replying
    #[arg(long)]
    pub root: Option<String>,

    /// Post being replied to (defaults to --root)
    #[arg(long, requires = "root")]
    pub parent: Option<String>,

    /// Number of attached images
    #[arg(long, default_value_t = 0)]
    pub img_count: i64,

    /// Post type tag
    #[arg(long = "type", default_value = "")]
    pub post_type: String,
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Id of the post to edit
    pub id: String,

    /// Replacement message; hashtags are re-extracted
    #[arg(long, short)]
    pub message: String,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Id of the post (a root takes its whole thread with it)
    pub id: String,
}

#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Any post id in the thread
    pub id: String,
}

#[derive(Parser, Debug)]
pub struct PageArgs {
    /// Channel id
    pub channel: String,

    /// Posts to skip, newest first
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Page size (at most 1000)
    #[arg(long, default_value_t = 60)]
    pub limit: u32,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Team to search in
    #[arg(long)]
    pub team: String,

    /// Searching user; only their channels are searched
    #[arg(long)]
    pub user: String,

    /// Search hashtags, keeping only exact tag matches
    #[arg(long)]
    pub hashtags: bool,

    /// Search terms
    #[arg(required = true)]
    pub terms: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct EtagArgs {
    /// Channel id
    pub channel: String,
}

pub async fn run_create(store: &PostStore, args: CreateArgs) -> Result<()> {
    let mut post = Post::new(args.channel, args.user, args.message);
    post.hashtags = parse_hashtags(&post.message);
    post.img_count = args.img_count;
    post.post_type = args.post_type;

    if let Some(root) = args.root {
        let parent = args.parent.unwrap_or_else(|| root.clone());
        post = post.reply_to(root, parent);
    }

    let post = store.create(post).await.context("Failed to create post")?;
    print_json(&post)
}

pub async fn run_edit(store: &PostStore, args: EditArgs) -> Result<()> {
    // Read from the primary so a just-created post is visible
    let old = store
        .primary()
        .live_post(&args.id)
        .await
        .context(format!("Failed to load post {}", args.id))?
        .ok_or_else(|| anyhow!("Post not found: {}", args.id))?;

    let hashtags = parse_hashtags(&args.message);
    let post = store
        .edit(old, args.message, hashtags)
        .await
        .context(format!("Failed to edit post {}", args.id))?;
    print_json(&post)
}

pub async fn run_delete(store: &PostStore, args: DeleteArgs) -> Result<()> {
    let deleted = store
        .delete(&args.id, now_millis())
        .await
        .context(format!("Failed to delete post {}", args.id))?;
    print_field("deleted", deleted)
}

pub async fn run_get(store: &PostStore, args: GetArgs) -> Result<()> {
    let lookup = store.get(&args.id).await?;

    match lookup.error {
        Some(err) if lookup.list.is_empty() => {
            Err(anyhow::Error::new(err).context(format!("Failed to get thread {}", args.id)))
        }
        Some(err) => {
            warn!(id = %args.id, error = %err, "returning partial thread");
            print_json(&lookup.list)
        }
        None => print_json(&lookup.list),
    }
}

pub async fn run_page(store: &PostStore, args: PageArgs) -> Result<()> {
    let list = store
        .get_page(&args.channel, args.offset, args.limit)
        .await
        .context(format!("Failed to page channel {}", args.channel))?;
    print_json(&list)
}

pub async fn run_search(store: &PostStore, args: SearchArgs) -> Result<()> {
    let terms = args.terms.join(" ");
    let list = store
        .search(args.team, args.user, terms, args.hashtags)
        .await
        .context("Search failed")?;
    print_json(&list)
}

pub async fn run_etag(store: &PostStore, args: EtagArgs) -> Result<()> {
    let etag = store.get_etag(&args.channel).await?;
    print_field("etag", etag)
}
