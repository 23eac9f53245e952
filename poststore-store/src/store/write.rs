//! Create, edit and delete.
//!
//! Each write is a sequence of independent statements. Once the first
//! statement commits, later failures are reported (or, for the channel
//! bump and root touch, only logged) without undoing it.

use std::sync::Arc;

use poststore_core::{new_id, now_millis, Post, StoreError};
use tracing::{debug, warn};

use super::{storage, PostStore};
use crate::backend::{PostBackend, Statement};
use crate::dispatch::StoreChannel;

impl PostStore {
    /// Persist a new post.
    ///
    /// The store assigns the id; a post that already carries one is
    /// rejected with `AlreadyExists`. On success the channel's last post
    /// time and message count are bumped and, for a reply, the root's
    /// `update_at` is touched so the thread sorts as recently active.
    pub fn create(&self, post: Post) -> StoreChannel<Post> {
        let backend = Arc::clone(&self.primary);

        StoreChannel::spawn("create", async move {
            if !post.id.is_empty() {
                return Err(StoreError::AlreadyExists { id: post.id });
            }

            let mut post = post;
            post.pre_save();
            post.strip_attachment_urls();
            post.is_valid()?;

            backend
                .insert_post(&post)
                .await
                .map_err(|e| storage(Statement::InsertPost, &post.id, e))?;
            debug!(id = %post.id, channel_id = %post.channel_id, "post created");

            bump_thread(backend.as_ref(), &post, now_millis(), 1).await;

            Ok(post)
        })
    }

    /// Replace a post's message and hashtags.
    ///
    /// The live row keeps `old.id` and receives the new content. The
    /// pre-edit content is inserted as a soft-deleted row under a fresh id
    /// whose `original_id` points back at `old.id`.
    pub fn edit(
        &self,
        old: Post,
        message: impl Into<String>,
        hashtags: impl Into<String>,
    ) -> StoreChannel<Post> {
        let backend = Arc::clone(&self.primary);
        let message = message.into();
        let hashtags = hashtags.into();

        StoreChannel::spawn("edit", async move {
            let now = now_millis();

            let mut old = old;
            old.strip_attachment_urls();

            let mut edited = old.clone();
            edited.message = message;
            edited.hashtags = hashtags;
            edited.update_at = now;
            edited.is_valid()?;

            let mut epitaph = old;
            epitaph.original_id = std::mem::take(&mut epitaph.id);
            epitaph.id = new_id();
            epitaph.delete_at = now;
            epitaph.update_at = now;

            let matched = backend
                .update_post(&edited)
                .await
                .map_err(|e| storage(Statement::UpdatePost, &edited.id, e))?;
            if matched == 0 {
                warn!(id = %edited.id, "edit matched no stored post");
            }

            bump_thread(backend.as_ref(), &edited, now_millis(), 0).await;

            backend
                .insert_post(&epitaph)
                .await
                .map_err(|e| storage(Statement::InsertPost, &epitaph.id, e))?;
            debug!(id = %edited.id, epitaph = %epitaph.id, "post edited");

            Ok(edited)
        })
    }

    /// Soft-delete `post_id` and every live post replying to it or rooted
    /// at it. Resolves to the number of rows deleted.
    pub fn delete(&self, post_id: impl Into<String>, at: i64) -> StoreChannel<u64> {
        let backend = Arc::clone(&self.primary);
        let post_id = post_id.into();

        StoreChannel::spawn("delete", async move {
            let deleted = backend
                .soft_delete_thread(&post_id, at)
                .await
                .map_err(|e| storage(Statement::SoftDelete, &post_id, e))?;
            debug!(id = %post_id, deleted, "posts soft-deleted");
            Ok(deleted)
        })
    }
}

/// Best-effort channel bump and root touch after a post write
async fn bump_thread(backend: &dyn PostBackend, post: &Post, at: i64, new_messages: i64) {
    if let Err(e) = backend.bump_channel(&post.channel_id, at, new_messages).await {
        warn!(channel_id = %post.channel_id, error = %e, "failed to bump channel");
    }

    if !post.is_root() {
        if let Err(e) = backend.touch_post(&post.root_id, at).await {
            warn!(root_id = %post.root_id, error = %e, "failed to touch thread root");
        }
    }
}
