//! `SQLite` persistence for the Veldt simulator.
//!
//! The world is the source of truth; this crate is its derived log.
//! Incremental rows (events, state deltas) land every tick through the
//! [`veldt_core::TickPersister`] hooks; a full snapshot rewrites every
//! entity table on the snapshot cadence; boot restores the newest
//! snapshot when one exists.
//!
//! # Modules
//!
//! - [`schema`] -- Table and index bootstrap
//! - [`snapshot_store`] -- Atomic full snapshot save/restore
//! - [`tick_persist`] -- Per-tick incremental writes

pub mod error;
pub mod schema;
pub mod snapshot_store;
pub mod tick_persist;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use veldt_core::{TickPersister, TickResult};
use veldt_world::WorldState;

pub use error::DbError;

/// Convert an id for an `INTEGER` column. Ids are allocated sequentially
/// and never approach the `i64` boundary in practice.
pub(crate) fn id_i64(raw: u64) -> i64 {
    i64::try_from(raw).unwrap_or(i64::MAX)
}

/// Serialize an entity for a JSON `data` column.
pub(crate) fn encode<T: serde::Serialize>(
    value: &T,
    table: &'static str,
) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|source| DbError::CorruptRow { table, source })
}

/// The wall-clock stamp written to `updated_at` columns.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Handle to the persistence layer: a pool plus the store operations.
#[derive(Debug, Clone)]
pub struct Persistence {
    pool: SqlitePool,
}

impl Persistence {
    /// Connect to the database and bootstrap the schema.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        schema::init(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (used by tests with in-memory databases).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, DbError> {
        schema::init(&pool).await?;
        Ok(Self { pool })
    }

    /// The underlying pool.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Restore the world from the last snapshot, if any.
    pub async fn load_world_snapshot(&self) -> Result<Option<WorldState>, DbError> {
        snapshot_store::load_world_snapshot(&self.pool).await
    }
}

impl TickPersister for Persistence {
    type Error = DbError;

    async fn persist_tick(
        &mut self,
        world: &WorldState,
        result: &TickResult,
    ) -> Result<(), DbError> {
        tick_persist::persist_tick_changes(&self.pool, world, result).await
    }

    async fn snapshot_world(&mut self, world: &WorldState) -> Result<(), DbError> {
        snapshot_store::save_snapshot(&self.pool, world).await
    }
}
