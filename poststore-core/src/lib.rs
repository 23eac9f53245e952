//! poststore-core: the post entity and the pure rules around it.
//!
//! Nothing in this crate touches storage. The store crate builds on these
//! types to persist posts, rebuild threads and run searches.

pub mod attachments;
pub mod error;
pub mod etag;
pub mod hashtags;
pub mod ids;
pub mod models;
pub mod search;

pub use attachments::image_urls;
pub use error::{BoxError, StoreError, StoreResult};
pub use etag::{empty_etag, post_etag, ETAG_ROOT_VERSION};
pub use hashtags::parse_hashtags;
pub use ids::{is_valid_id, new_id, now_millis, ID_LEN};
pub use models::{Channel, Post, PostList, ValidationError};
pub use search::{exact_hashtag_match, sanitize_terms, SearchField, SearchWord};
