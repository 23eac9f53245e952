//! Domain models with validation
//!
//! A post is validated before every write. Invalid input returns
//! ValidationError, never a panic.

pub mod channel;
pub mod post;
pub mod post_list;
pub mod validation;

pub use channel::Channel;
pub use post::Post;
pub use post_list::PostList;
pub use validation::ValidationError;
