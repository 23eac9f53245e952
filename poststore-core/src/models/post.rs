//! The post entity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::attachments::image_urls;
use crate::ids::{is_valid_id, new_id, now_millis};

/// Maximum length of the message column
pub const MAX_MESSAGE_LEN: usize = 4000;
/// Maximum length of the hashtags column
pub const MAX_HASHTAGS_LEN: usize = 1000;
/// Maximum length of serialized props
pub const MAX_PROPS_LEN: usize = 4000;
/// Maximum length of serialized filenames
pub const MAX_FILENAMES_LEN: usize = 4000;
/// Maximum length of the type column
pub const MAX_TYPE_LEN: usize = 26;

/// A chat message, root or reply.
///
/// Content never changes in place. An edit keeps `id` on the live row and
/// stores the pre-edit content as a soft-deleted epitaph row under a new id
/// whose `original_id` points back here. `delete_at == 0` is the only
/// liveness test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: String,
    pub create_at: i64,
    pub update_at: i64,
    pub delete_at: i64,
    pub user_id: String,
    pub channel_id: String,
    /// Thread root; empty when this post is the root
    pub root_id: String,
    /// Post being replied to; shares the thread of `root_id`
    pub parent_id: String,
    /// On an epitaph row, the id the edited content now lives under
    pub original_id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub post_type: String,
    pub props: HashMap<String, String>,
    pub hashtags: String,
    pub filenames: Vec<String>,
    pub img_count: i64,
}

impl Post {
    /// New root post, not yet saved
    pub fn new(
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Make this post a reply in the thread rooted at `root_id`
    pub fn reply_to(mut self, root_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        self.root_id = root_id.into();
        self.parent_id = parent_id.into();
        self
    }

    pub fn with_hashtags(mut self, hashtags: impl Into<String>) -> Self {
        self.hashtags = hashtags.into();
        self
    }

    pub fn with_img_count(mut self, img_count: i64) -> Self {
        self.img_count = img_count;
        self
    }

    pub fn is_live(&self) -> bool {
        self.delete_at == 0
    }

    pub fn is_root(&self) -> bool {
        self.root_id.is_empty()
    }

    /// Id of the thread this post belongs to: its root, or itself
    pub fn thread_root_id(&self) -> &str {
        if self.root_id.is_empty() {
            &self.id
        } else {
            &self.root_id
        }
    }

    /// Assign identity and timestamps before the first insert.
    ///
    /// A missing id is generated, a missing `create_at` becomes now, and
    /// `update_at` starts equal to `create_at`.
    pub fn pre_save(&mut self) {
        if self.id.is_empty() {
            self.id = new_id();
        }

        self.original_id.clear();

        if self.create_at == 0 {
            self.create_at = now_millis();
        }
        self.update_at = self.create_at;
    }

    /// Props as stored
    pub fn props_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string(&self.props).map_err(|e| ValidationError::InvalidFormat {
            field: "props",
            reason: e.to_string(),
        })
    }

    /// Filenames as stored
    pub fn filenames_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string(&self.filenames).map_err(|e| ValidationError::InvalidFormat {
            field: "filenames",
            reason: e.to_string(),
        })
    }

    /// Check every size bound and id shape.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        require_id("id", &self.id)?;

        if self.create_at <= 0 {
            return Err(ValidationError::InvalidTimestamp { field: "create_at" });
        }
        if self.update_at <= 0 {
            return Err(ValidationError::InvalidTimestamp { field: "update_at" });
        }

        require_id("user_id", &self.user_id)?;
        require_id("channel_id", &self.channel_id)?;
        optional_id("root_id", &self.root_id)?;
        optional_id("parent_id", &self.parent_id)?;
        optional_id("original_id", &self.original_id)?;

        if !self.parent_id.is_empty() && self.root_id.is_empty() {
            return Err(ValidationError::MissingRoot);
        }

        max_len("message", &self.message, MAX_MESSAGE_LEN)?;
        max_len("hashtags", &self.hashtags, MAX_HASHTAGS_LEN)?;
        max_len("type", &self.post_type, MAX_TYPE_LEN)?;
        max_len("props", &self.props_json()?, MAX_PROPS_LEN)?;
        max_len("filenames", &self.filenames_json()?, MAX_FILENAMES_LEN)?;

        Ok(())
    }

    /// Fill `filenames` with the derived image URLs when images are attached
    pub fn with_attachment_urls(mut self) -> Self {
        if self.img_count > 0 {
            self.filenames = image_urls(&self.channel_id, &self.id, self.img_count);
        }
        self
    }

    /// Drop the image URLs [`Post::with_attachment_urls`] derived, keeping
    /// any other filenames. Derived URLs are never stored.
    pub fn strip_attachment_urls(&mut self) {
        if self.img_count > 0 && !self.filenames.is_empty() {
            let derived = image_urls(&self.channel_id, &self.id, self.img_count);
            self.filenames.retain(|name| !derived.contains(name));
        }
    }
}

fn require_id(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_valid_id(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidId { field })
    }
}

fn optional_id(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Ok(())
    } else {
        require_id(field, value)
    }
}

fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::new_id;

    fn saved_post() -> Post {
        let mut post = Post::new(new_id(), new_id(), "hello");
        post.pre_save();
        post
    }

    #[test]
    fn pre_save_assigns_identity() {
        let post = saved_post();
        assert!(is_valid_id(&post.id));
        assert!(post.create_at > 0);
        assert_eq!(post.create_at, post.update_at);
        assert!(post.is_valid().is_ok());
    }

    #[test]
    fn pre_save_keeps_existing_create_at() {
        let mut post = Post::new(new_id(), new_id(), "hello");
        post.create_at = 1234;
        post.pre_save();
        assert_eq!(post.create_at, 1234);
        assert_eq!(post.update_at, 1234);
    }

    #[test]
    fn rejects_unsaved_post() {
        let post = Post::new(new_id(), new_id(), "hello");
        assert_eq!(post.is_valid(), Err(ValidationError::InvalidId { field: "id" }));

        let mut post = saved_post();
        post.create_at = 0;
        assert_eq!(
            post.is_valid(),
            Err(ValidationError::InvalidTimestamp { field: "create_at" })
        );
    }

    #[test]
    fn message_bound() {
        let mut post = saved_post();
        post.message = "a".repeat(MAX_MESSAGE_LEN);
        assert!(post.is_valid().is_ok());

        post.message.push('a');
        assert_eq!(
            post.is_valid(),
            Err(ValidationError::TooLong {
                field: "message",
                max: MAX_MESSAGE_LEN
            })
        );
    }

    #[test]
    fn hashtags_and_props_bounds() {
        let mut post = saved_post();
        post.hashtags = "#".repeat(MAX_HASHTAGS_LEN + 1);
        assert!(matches!(
            post.is_valid(),
            Err(ValidationError::TooLong { field: "hashtags", .. })
        ));

        let mut post = saved_post();
        post.props.insert("k".into(), "v".repeat(MAX_PROPS_LEN));
        assert!(matches!(
            post.is_valid(),
            Err(ValidationError::TooLong { field: "props", .. })
        ));
    }

    #[test]
    fn reply_ids_must_be_well_formed() {
        let mut post = saved_post();
        post.root_id = "not-an-id".into();
        assert_eq!(
            post.is_valid(),
            Err(ValidationError::InvalidId { field: "root_id" })
        );

        let mut post = saved_post();
        post.parent_id = new_id();
        assert_eq!(post.is_valid(), Err(ValidationError::MissingRoot));

        let root = new_id();
        let post = saved_post().reply_to(root.clone(), root);
        assert!(post.is_valid().is_ok());
    }

    #[test]
    fn thread_root_is_self_for_roots() {
        let post = saved_post();
        assert!(post.is_root());
        assert_eq!(post.thread_root_id(), post.id);

        let reply = saved_post().reply_to(post.id.clone(), post.id.clone());
        assert_eq!(reply.thread_root_id(), post.id);
    }

    #[test]
    fn attachment_urls_only_when_images_present() {
        let post = saved_post().with_attachment_urls();
        assert!(post.filenames.is_empty());

        let post = saved_post().with_img_count(2).with_attachment_urls();
        assert_eq!(post.filenames.len(), 2);
        assert!(post.filenames[0].ends_with("/1.png"));
        assert!(post.filenames[1].ends_with("/2.png"));
    }

    #[test]
    fn stripping_removes_only_derived_urls() {
        let mut post = saved_post().with_img_count(2).with_attachment_urls();
        post.filenames.push("notes.txt".into());

        post.strip_attachment_urls();

        assert_eq!(post.filenames, vec!["notes.txt".to_string()]);
    }

    #[test]
    fn serializes_type_field() {
        let mut post = saved_post();
        post.post_type = "system_join".into();
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["type"], "system_join");

        let back: Post = serde_json::from_value(json).unwrap();
        assert_eq!(back, post);
    }
}
