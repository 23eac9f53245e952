use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Post;

/// Posts keyed by id plus the display order.
///
/// `order` drives a linear scroll; `posts` may hold more than `order` names
/// (thread context hanging off the listed posts). Adding a post whose id is
/// already present replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostList {
    pub order: Vec<String>,
    pub posts: HashMap<String, Post>,
}

impl PostList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            posts: HashMap::with_capacity(capacity),
        }
    }

    pub fn add_post(&mut self, post: Post) {
        self.posts.insert(post.id.clone(), post);
    }

    pub fn add_order(&mut self, id: impl Into<String>) {
        self.order.push(id.into());
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.posts.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.posts.contains_key(id)
    }

    /// Posts named by `order`, in display order
    pub fn ordered(&self) -> impl Iterator<Item = &Post> {
        self.order.iter().filter_map(|id| self.posts.get(id))
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
