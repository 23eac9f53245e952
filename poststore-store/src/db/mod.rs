//! Postgres layer - connection pool, schema and the sqlx backend
//!
//! - Connection pool per database (primary, optional replica)
//! - Raw `sqlx::query` statements, one per backend method
//! - No transactions: each statement commits on its own

pub mod migrations;
pub mod pool;
pub mod postgres;

pub use pool::{create_pool, create_pool_with_options};
pub use postgres::PgBackend;
