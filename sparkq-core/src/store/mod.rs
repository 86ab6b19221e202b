/// The Store: sole arbiter of durable state
///
/// Every exposed operation is atomic (a single transaction against the
/// write pool) and reports `NotFound`, `Conflict`, or `Invalid` where
/// applicable. Reads that don't need transactional isolation go through
/// the read pool so they never queue behind writers.
///
/// # Modules
///
/// - `project`: singleton project bootstrap
/// - `session`: session CRUD
/// - `queue`: queue CRUD plus derived-status resolution
/// - `task`: task CRUD plus the specialized claim/finalize/requeue/stale/
///   purge operations
/// - `task_class`: task-class registry CRUD
/// - `tool`: tool registry CRUD
/// - `config`: config-entry CRUD
/// - `stats`: summary counts for `GET /api/stats`
use crate::db::pool::DbPools;

mod config;
mod project;
mod queue;
mod session;
mod stats;
mod task;
mod task_class;
mod tool;

pub use stats::Stats;

/// Handle to the durable state. Cheaply `Clone`-able: both pools are
/// `sqlx::Pool`, which is itself an `Arc` internally.
#[derive(Clone)]
pub struct Store {
    pools: DbPools,
}

impl Store {
    pub fn new(pools: DbPools) -> Self {
        Self { pools }
    }

    fn write_pool(&self) -> &sqlx::SqlitePool {
        &self.pools.write
    }

    fn read_pool(&self) -> &sqlx::SqlitePool {
        &self.pools.read
    }

    /// Checks connectivity of both pools. Used by the `/health` endpoint.
    pub async fn health_check(&self) -> crate::error::StoreResult<()> {
        crate::db::pool::health_check(&self.pools.read)
            .await
            .map_err(crate::error::StoreError::from_sqlx)?;
        crate::db::pool::health_check(&self.pools.write)
            .await
            .map_err(crate::error::StoreError::from_sqlx)
    }
}
