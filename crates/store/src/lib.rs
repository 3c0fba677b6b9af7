//! # geomark-store
//!
//! The per-user document store. Each user owns exactly one document holding
//! their subjects, weekly schedule, minimum-attendance setting, and
//! attendance records; writes replace only the top-level fields they name.
//!
//! Two implementations of the [`DocumentStore`] contract are provided: a
//! Postgres-backed store (one JSONB row per user) and an in-memory store
//! for tests and single-process runs. The `mock` module carries mockall
//! doubles for callers that need scripted store behavior.

pub mod documents;
pub mod memory;
pub mod schema;
pub mod store;

pub mod mock;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub use memory::MemoryStore;
pub use store::{DocumentStore, PgStore};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
