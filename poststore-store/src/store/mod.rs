//! The post store: dispatches each operation onto a backend.
//!
//! Writes (`create`, `edit`, `delete`) use the primary backend; reads
//! (`get`, `get_page`, `search`, `get_etag`) use the replica. Both handles
//! point at the same backend unless a replica was configured.

mod read;
mod search;
mod write;

use std::sync::Arc;

use poststore_core::{PostList, StoreError, StoreResult};

use crate::backend::{BackendError, PostBackend, Statement};
use crate::config::StoreConfig;
use crate::db::{self, PgBackend};

/// Largest page `get_page` will serve
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Posts store handle; cheap to clone
#[derive(Clone)]
pub struct PostStore {
    primary: Arc<dyn PostBackend>,
    replica: Arc<dyn PostBackend>,
}

impl PostStore {
    /// Store reading and writing through one backend
    pub fn new(backend: Arc<dyn PostBackend>) -> Self {
        Self {
            replica: Arc::clone(&backend),
            primary: backend,
        }
    }

    /// Store writing to `primary` and reading from `replica`
    pub fn with_replica(primary: Arc<dyn PostBackend>, replica: Arc<dyn PostBackend>) -> Self {
        Self { primary, replica }
    }

    /// Connect to Postgres per `config`, running migrations first when asked
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let primary = db::create_pool_with_options(&config.database_url, config.max_connections)
            .await
            .map_err(|e| StoreError::storage("connect", "primary", e))?;
        tracing::info!("connected to primary database");

        if config.migrate {
            db::migrations::run(&primary)
                .await
                .map_err(|e| StoreError::storage("migrate", "primary", e))?;
        }

        let primary: Arc<dyn PostBackend> = Arc::new(PgBackend::new(primary));

        match &config.replica_url {
            Some(url) => {
                let replica = db::create_pool_with_options(url, config.max_connections)
                    .await
                    .map_err(|e| StoreError::storage("connect", "replica", e))?;
                tracing::info!("connected to read replica");
                Ok(Self::with_replica(primary, Arc::new(PgBackend::new(replica))))
            }
            None => Ok(Self::new(primary)),
        }
    }

    /// Backend receiving writes
    pub fn primary(&self) -> &Arc<dyn PostBackend> {
        &self.primary
    }

    /// Backend serving reads
    pub fn replica(&self) -> &Arc<dyn PostBackend> {
        &self.replica
    }
}

/// Outcome of [`PostStore::get`].
///
/// The post lookup and the thread lookup are independent, so a miss on
/// one still returns whatever the other found. `error` holds the first
/// failure seen.
#[derive(Debug, Default)]
pub struct ThreadLookup {
    pub list: PostList,
    pub error: Option<StoreError>,
}

impl ThreadLookup {
    /// Drop the partial result if anything failed
    pub fn into_result(self) -> StoreResult<PostList> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.list),
        }
    }

    fn record(&mut self, err: StoreError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

/// Wrap a backend error as a storage failure on `id`
fn storage(statement: Statement, id: &str, err: BackendError) -> StoreError {
    StoreError::storage(statement.as_str(), id, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use poststore_core::Post;

    #[test]
    fn lookup_keeps_first_error() {
        let mut lookup = ThreadLookup::default();
        lookup.record(StoreError::not_found("a"));
        lookup.record(StoreError::not_found("b"));

        match lookup.into_result() {
            Err(StoreError::NotFound { id }) => assert_eq!(id, "a"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn clean_lookup_yields_list() {
        let mut lookup = ThreadLookup::default();
        lookup.list.add_post(Post::new("c", "u", "m"));
        assert_eq!(lookup.into_result().unwrap().len(), 1);
    }

    #[test]
    fn single_backend_serves_both_roles() {
        let backend: Arc<dyn PostBackend> = Arc::new(MemoryBackend::new());
        let store = PostStore::new(backend);
        assert!(Arc::ptr_eq(store.primary(), store.replica()));
    }
}
