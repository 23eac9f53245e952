//! In-process backend.
//!
//! Holds the posts, channels and channel_members tables in memory with the
//! same statement semantics as the Postgres backend. Faults can be queued
//! per statement so partial-write windows can be exercised.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use poststore_core::search::{fulltext_matches, SEARCH_LIMIT};
use poststore_core::{Channel, Post, SearchField, SearchWord};
use tokio::sync::Mutex;

use crate::backend::{BackendError, PostBackend, Statement};

#[derive(Default)]
struct Tables {
    /// Insertion order doubles as the tie-breaker for equal timestamps
    posts: Vec<Post>,
    channels: HashMap<String, Channel>,
    members: HashSet<(String, String)>,
    faults: Vec<Statement>,
}

impl Tables {
    /// Consume one queued fault for `statement`, if any
    fn check(&mut self, statement: Statement) -> Result<(), BackendError> {
        match self.faults.iter().position(|f| *f == statement) {
            Some(i) => {
                self.faults.remove(i);
                Err(BackendError::Injected(statement))
            }
            None => Ok(()),
        }
    }

    fn live_in_channel<'a>(&'a self, channel_id: &'a str) -> impl Iterator<Item = &'a Post> {
        self.posts
            .iter()
            .filter(move |p| p.is_live() && p.channel_id == channel_id)
    }

    fn window(&self, channel_id: &str, offset: u32, limit: u32) -> Vec<Post> {
        let mut posts: Vec<&Post> = self.live_in_channel(channel_id).collect();
        posts.sort_by(|a, b| b.create_at.cmp(&a.create_at));
        posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect()
    }
}

/// In-memory backend
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next execution of `statement` fail
    pub async fn fail_next(&self, statement: Statement) {
        self.tables.lock().await.faults.push(statement);
    }

    /// Every stored row, live or not, in insertion order
    pub async fn all_posts(&self) -> Vec<Post> {
        self.tables.lock().await.posts.clone()
    }
}

#[async_trait]
impl PostBackend for MemoryBackend {
    async fn insert_post(&self, post: &Post) -> Result<(), BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::InsertPost)?;

        if tables.posts.iter().any(|p| p.id == post.id) {
            return Err(BackendError::Duplicate(post.id.clone()));
        }
        tables.posts.push(post.clone());
        Ok(())
    }

    async fn update_post(&self, post: &Post) -> Result<u64, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::UpdatePost)?;

        match tables.posts.iter_mut().find(|p| p.id == post.id) {
            Some(row) => {
                *row = post.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn bump_channel(
        &self,
        channel_id: &str,
        at: i64,
        new_messages: i64,
    ) -> Result<u64, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::BumpChannel)?;

        match tables.channels.get_mut(channel_id) {
            Some(channel) => {
                channel.last_post_at = at;
                channel.total_msg_count += new_messages;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn touch_post(&self, id: &str, at: i64) -> Result<u64, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::TouchPost)?;

        let mut touched = 0;
        for post in tables.posts.iter_mut().filter(|p| p.id == id) {
            post.update_at = at;
            touched += 1;
        }
        Ok(touched)
    }

    async fn soft_delete_thread(&self, post_id: &str, at: i64) -> Result<u64, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::SoftDelete)?;

        let mut deleted = 0;
        for post in tables.posts.iter_mut().filter(|p| {
            p.is_live() && (p.id == post_id || p.parent_id == post_id || p.root_id == post_id)
        }) {
            post.delete_at = at;
            post.update_at = at;
            deleted += 1;
        }
        Ok(deleted)
    }

    async fn live_post(&self, id: &str) -> Result<Option<Post>, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::LivePost)?;

        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == id && p.is_live())
            .cloned())
    }

    async fn thread_posts(&self, root_id: &str) -> Result<Vec<Post>, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::ThreadPosts)?;

        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.is_live() && (p.id == root_id || p.root_id == root_id))
            .cloned()
            .collect();
        posts.sort_by_key(|p| p.create_at);
        Ok(posts)
    }

    async fn page_window(
        &self,
        channel_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Post>, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::PageWindow)?;

        Ok(tables.window(channel_id, offset, limit))
    }

    async fn page_threads(
        &self,
        channel_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Post>, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::PageThreads)?;

        let roots: HashSet<String> = tables
            .window(channel_id, offset, limit)
            .iter()
            .map(|p| p.thread_root_id().to_owned())
            .collect();

        let mut posts: Vec<Post> = tables
            .live_in_channel(channel_id)
            .filter(|p| roots.contains(&p.id) || roots.contains(&p.root_id))
            .cloned()
            .collect();
        posts.sort_by_key(|p| p.create_at);
        Ok(posts)
    }

    async fn search_posts(
        &self,
        team_id: &str,
        user_id: &str,
        field: SearchField,
        words: &[SearchWord],
    ) -> Result<Vec<Post>, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::SearchPosts)?;

        let channel_ids: HashSet<&str> = tables
            .members
            .iter()
            .filter(|(_, member)| member == user_id)
            .filter_map(|(channel_id, _)| tables.channels.get(channel_id))
            .filter(|c| c.is_live() && c.team_id == team_id)
            .map(|c| c.id.as_str())
            .collect();

        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.is_live() && channel_ids.contains(p.channel_id.as_str()))
            .filter(|p| {
                let text = match field {
                    SearchField::Message => &p.message,
                    SearchField::Hashtags => &p.hashtags,
                };
                fulltext_matches(text, words)
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.create_at.cmp(&a.create_at));
        posts.truncate(SEARCH_LIMIT as usize);
        Ok(posts)
    }

    async fn latest_update(&self, channel_id: &str) -> Result<Option<(String, i64)>, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::LatestUpdate)?;

        Ok(tables
            .live_in_channel(channel_id)
            .max_by_key(|p| p.update_at)
            .map(|p| (p.id.clone(), p.update_at)))
    }

    async fn upsert_channel(&self, channel: &Channel) -> Result<(), BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::UpsertChannel)?;

        tables.channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn add_channel_member(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<(), BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::AddMember)?;

        tables
            .members
            .insert((channel_id.to_owned(), user_id.to_owned()));
        Ok(())
    }

    async fn get_channel(&self, id: &str) -> Result<Option<Channel>, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.check(Statement::GetChannel)?;

        Ok(tables.channels.get(id).cloned())
    }
}
