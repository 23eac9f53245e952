//! poststore-store: persistence and retrieval for threaded chat posts
//!
//! Every operation is dispatched as its own task and hands back a
//! [`StoreChannel`] that resolves exactly once. Writes go to the primary
//! backend, reads to the replica (the same backend unless configured).
//!
//! Multi-statement writes are not transactional: a failure
//! after the first statement leaves earlier statements committed.

pub mod backend;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod memory;
pub mod store;

pub use backend::{BackendError, PostBackend, Statement};
pub use config::StoreConfig;
pub use db::PgBackend;
pub use dispatch::StoreChannel;
pub use memory::MemoryBackend;
pub use store::{PostStore, ThreadLookup, MAX_PAGE_LIMIT};
