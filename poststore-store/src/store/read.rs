use std::sync::Arc;

use poststore_core::{empty_etag, now_millis, post_etag, PostList, StoreError};
use tracing::{debug, warn};

use super::{storage, PostStore, ThreadLookup, MAX_PAGE_LIMIT};
use crate::backend::Statement;
use crate::dispatch::StoreChannel;

impl PostStore {
    /// Rebuild the thread containing `id`.
    ///
    /// `order` names only `id` itself; the rest of the thread sits in the
    /// post map. A missing post is reported as `NotFound` while the thread
    /// lookup still runs with `id` taken as the root.
    pub fn get(&self, id: impl Into<String>) -> StoreChannel<ThreadLookup> {
        let backend = Arc::clone(&self.replica);
        let id = id.into();

        StoreChannel::spawn("get", async move {
            let mut lookup = ThreadLookup::default();

            let root_id = match backend.live_post(&id).await {
                Ok(Some(post)) => {
                    let root_id = post.thread_root_id().to_owned();
                    lookup.list.add_post(post.with_attachment_urls());
                    lookup.list.add_order(id.clone());
                    root_id
                }
                Ok(None) => {
                    lookup.record(StoreError::not_found(&id));
                    id.clone()
                }
                Err(e) => {
                    lookup.record(storage(Statement::LivePost, &id, e));
                    id.clone()
                }
            };

            match backend.thread_posts(&root_id).await {
                Ok(posts) => {
                    for post in posts {
                        lookup.list.add_post(post.with_attachment_urls());
                    }
                }
                Err(e) => lookup.record(storage(Statement::ThreadPosts, &root_id, e)),
            }

            debug!(%id, %root_id, posts = lookup.list.len(), "thread fetched");
            Ok(lookup)
        })
    }

    /// One page of a channel, newest first, plus the full thread of every
    /// post on the page.
    ///
    /// Posts in the window make up `order`; their thread context only
    /// lands in the post map.
    pub fn get_page(
        &self,
        channel_id: impl Into<String>,
        offset: u32,
        limit: u32,
    ) -> StoreChannel<PostList> {
        let backend = Arc::clone(&self.replica);
        let channel_id = channel_id.into();

        StoreChannel::spawn("get_page", async move {
            if limit > MAX_PAGE_LIMIT {
                return Err(StoreError::LimitExceeded {
                    channel_id,
                    limit,
                    max: MAX_PAGE_LIMIT,
                });
            }

            let window = {
                let backend = Arc::clone(&backend);
                let channel_id = channel_id.clone();
                StoreChannel::spawn("page_window", async move {
                    backend
                        .page_window(&channel_id, offset, limit)
                        .await
                        .map_err(|e| storage(Statement::PageWindow, &channel_id, e))
                })
            };
            let threads = {
                let channel_id = channel_id.clone();
                StoreChannel::spawn("page_threads", async move {
                    backend
                        .page_threads(&channel_id, offset, limit)
                        .await
                        .map_err(|e| storage(Statement::PageThreads, &channel_id, e))
                })
            };

            let (window, threads) = tokio::join!(window, threads);
            let window = window?;
            let threads = threads?;

            let mut list = PostList::with_capacity(window.len() + threads.len());
            for post in window {
                list.add_order(post.id.clone());
                list.add_post(post.with_attachment_urls());
            }
            for post in threads {
                list.add_post(post.with_attachment_urls());
            }

            debug!(%channel_id, offset, limit, posts = list.len(), "page fetched");
            Ok(list)
        })
    }

    /// Freshness token for a channel's posts.
    ///
    /// Stable while the most recently updated live post is unchanged. An
    /// empty channel, or a failed lookup, yields a token that differs from
    /// call to call.
    pub fn get_etag(&self, channel_id: impl Into<String>) -> StoreChannel<String> {
        let backend = Arc::clone(&self.replica);
        let channel_id = channel_id.into();

        StoreChannel::spawn("get_etag", async move {
            let etag = match backend.latest_update(&channel_id).await {
                Ok(Some((id, update_at))) => post_etag(&id, update_at),
                Ok(None) => empty_etag(now_millis()),
                Err(e) => {
                    warn!(%channel_id, error = %e, "etag lookup failed");
                    empty_etag(now_millis())
                }
            };
            Ok(etag)
        })
    }
}
