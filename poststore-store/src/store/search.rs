use std::sync::Arc;

use poststore_core::search::search_words;
use poststore_core::{exact_hashtag_match, sanitize_terms, PostList, SearchField};
use tracing::debug;

use super::{storage, PostStore};
use crate::backend::Statement;
use crate::dispatch::StoreChannel;

impl PostStore {
    /// Full-text search over channels `user_id` belongs to in `team_id`.
    ///
    /// Hashtag searches run against the hashtags column and then keep only
    /// posts carrying a tag equal to one of the terms. Results are newest
    /// first and carry no attachment URLs.
    pub fn search(
        &self,
        team_id: impl Into<String>,
        user_id: impl Into<String>,
        terms: impl Into<String>,
        is_hashtag_search: bool,
    ) -> StoreChannel<PostList> {
        let backend = Arc::clone(&self.replica);
        let team_id = team_id.into();
        let user_id = user_id.into();
        let terms = terms.into();

        StoreChannel::spawn("search", async move {
            let field = SearchField::for_hashtag_search(is_hashtag_search);
            let words = search_words(&sanitize_terms(&terms));

            let mut list = PostList::new();
            if words.is_empty() {
                return Ok(list);
            }

            let posts = backend
                .search_posts(&team_id, &user_id, field, &words)
                .await
                .map_err(|e| storage(Statement::SearchPosts, &user_id, e))?;

            for post in posts {
                if is_hashtag_search && !exact_hashtag_match(&post.hashtags, &terms) {
                    continue;
                }
                list.add_order(post.id.clone());
                list.add_post(post);
            }

            debug!(%team_id, %user_id, field = field.column(), hits = list.order.len(), "search done");
            Ok(list)
        })
    }
}
