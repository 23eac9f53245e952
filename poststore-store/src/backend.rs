//! Backing store seam.
//!
//! One method per relational statement the store issues. Implementations:
//! - [`crate::PgBackend`]: Postgres through sqlx
//! - [`crate::MemoryBackend`]: in-process tables with fault injection

use std::fmt;

use async_trait::async_trait;
use poststore_core::{Channel, Post, SearchField, SearchWord, ValidationError};

/// Statements a backend executes, named for logging and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    InsertPost,
    UpdatePost,
    BumpChannel,
    TouchPost,
    SoftDelete,
    LivePost,
    ThreadPosts,
    PageWindow,
    PageThreads,
    SearchPosts,
    LatestUpdate,
    UpsertChannel,
    AddMember,
    GetChannel,
}

impl Statement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsertPost => "insert_post",
            Self::UpdatePost => "update_post",
            Self::BumpChannel => "bump_channel",
            Self::TouchPost => "touch_post",
            Self::SoftDelete => "soft_delete",
            Self::LivePost => "live_post",
            Self::ThreadPosts => "thread_posts",
            Self::PageWindow => "page_window",
            Self::PageThreads => "page_threads",
            Self::SearchPosts => "search_posts",
            Self::LatestUpdate => "latest_update",
            Self::UpsertChannel => "upsert_channel",
            Self::AddMember => "add_member",
            Self::GetChannel => "get_channel",
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend error type
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("corrupt {column} column on post {id}: {source}")]
    Decode {
        column: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode post: {0}")]
    Encode(#[from] ValidationError),

    #[error("duplicate post id {0}")]
    Duplicate(String),

    #[error("injected failure in {0}")]
    Injected(Statement),
}

/// Relational operations behind the post store (testable)
#[async_trait]
pub trait PostBackend: Send + Sync + 'static {
    /// Insert a new post row
    async fn insert_post(&self, post: &Post) -> Result<(), BackendError>;

    /// Overwrite every column of the row with `post.id`; returns rows matched
    async fn update_post(&self, post: &Post) -> Result<u64, BackendError>;

    /// Set `last_post_at` and add `new_messages` to the message counter
    async fn bump_channel(
        &self,
        channel_id: &str,
        at: i64,
        new_messages: i64,
    ) -> Result<u64, BackendError>;

    /// Set `update_at` on one post
    async fn touch_post(&self, id: &str, at: i64) -> Result<u64, BackendError>;

    /// Soft-delete the live post `post_id` and every live post whose
    /// `parent_id` or `root_id` is `post_id`; returns rows flipped
    async fn soft_delete_thread(&self, post_id: &str, at: i64) -> Result<u64, BackendError>;

    /// The live row for `id`
    async fn live_post(&self, id: &str) -> Result<Option<Post>, BackendError>;

    /// Live root `root_id` plus its live replies, oldest first
    async fn thread_posts(&self, root_id: &str) -> Result<Vec<Post>, BackendError>;

    /// Live channel posts, newest first, `limit` rows from `offset`
    async fn page_window(
        &self,
        channel_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Post>, BackendError>;

    /// Every live channel post in a thread touched by the same window,
    /// oldest first
    async fn page_threads(
        &self,
        channel_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Post>, BackendError>;

    /// Full-text candidates in channels `user_id` belongs to within
    /// `team_id`, newest first, at most `SEARCH_LIMIT`
    async fn search_posts(
        &self,
        team_id: &str,
        user_id: &str,
        field: SearchField,
        words: &[SearchWord],
    ) -> Result<Vec<Post>, BackendError>;

    /// `(id, update_at)` of the most recently updated live channel post
    async fn latest_update(&self, channel_id: &str) -> Result<Option<(String, i64)>, BackendError>;

    /// Insert or replace a channel row
    async fn upsert_channel(&self, channel: &Channel) -> Result<(), BackendError>;

    /// Record `user_id` as a member of `channel_id` (idempotent)
    async fn add_channel_member(&self, channel_id: &str, user_id: &str)
        -> Result<(), BackendError>;

    async fn get_channel(&self, id: &str) -> Result<Option<Channel>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injected_error_names_statement() {
        let err = BackendError::Injected(Statement::BumpChannel);
        assert_eq!(err.to_string(), "injected failure in bump_channel");
    }
}
