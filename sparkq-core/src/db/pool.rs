/// Database connection pool management
///
/// SparkQ embeds a single SQLite database file in WAL mode. Writers are
/// serialized by the database itself rather than by an application-level
/// mutex: the write pool is capped at one connection, while a separate
/// read pool allows concurrent readers to proceed without blocking on
/// in-flight writes. This is the SQLite analogue of the single-writer
/// guarantee a Postgres deployment gets from row locks.
///
/// # Example
///
/// ```no_run
/// use sparkq_core::db::pool::{create_pools, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         path: "sparkq/data/sparkq.db".to_string(),
///         ..Default::default()
///     };
///
///     let pools = create_pools(config).await?;
///     Ok(())
/// }
/// ```
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the database connection pools
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Filesystem path to the SQLite database file
    pub path: String,

    /// Maximum number of concurrent reader connections
    ///
    /// Default: 8
    pub max_read_connections: u32,

    /// Timeout for acquiring a connection from either pool (seconds)
    ///
    /// Default: 30 seconds
    pub connect_timeout_seconds: u64,

    /// How long SQLite waits on a locked database before returning
    /// `SQLITE_BUSY` (seconds)
    ///
    /// Default: 5 seconds
    pub busy_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "sparkq/data/sparkq.db".to_string(),
            max_read_connections: 8,
            connect_timeout_seconds: 30,
            busy_timeout_seconds: 5,
        }
    }
}

/// The two connection pools SparkQ keeps open against the same database
/// file: a single-connection writer and a multi-connection reader.
#[derive(Debug, Clone)]
pub struct DbPools {
    /// Write pool, capped at one connection so SQLite's own locking
    /// serializes mutations without an application-level mutex.
    pub write: SqlitePool,

    /// Read pool, sized for concurrent GET traffic.
    pub read: SqlitePool,
}

fn connect_options(path: &str, busy_timeout_seconds: u64) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(busy_timeout_seconds))
        .foreign_keys(true)
}

/// Creates and initializes the write and read connection pools.
///
/// # Errors
///
/// Returns an error if the database file cannot be created or opened, or
/// if the initial health check fails.
pub async fn create_pools(config: DatabaseConfig) -> Result<DbPools, sqlx::Error> {
    info!(
        path = %config.path,
        max_read_connections = config.max_read_connections,
        "Creating database connection pools"
    );

    let write_opts = connect_options(&config.path, config.busy_timeout_seconds);
    let write = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect_with(write_opts)
        .await?;

    let read_opts = connect_options(&config.path, config.busy_timeout_seconds);
    let read = SqlitePoolOptions::new()
        .max_connections(config.max_read_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect_with(read_opts)
        .await?;

    health_check(&write).await?;
    health_check(&read).await?;

    info!("Database connection pools created successfully");
    Ok(DbPools { write, read })
}

/// Performs a health check on a pool by running a trivial query.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        warn!(
            value = result.0,
            "Database health check returned unexpected value"
        );
        Err(sqlx::Error::Protocol(
            "health check returned unexpected value".into(),
        ))
    }
}

/// Point-in-time pool statistics for monitoring.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub active_connections: usize,
    pub idle_connections: usize,
    pub total_connections: usize,
}

pub fn get_pool_stats(pool: &SqlitePool) -> PoolStats {
    let size = pool.size();
    let idle = pool.num_idle();

    PoolStats {
        active_connections: (size as usize).saturating_sub(idle),
        idle_connections: idle,
        total_connections: size as usize,
    }
}

/// Gracefully closes both connection pools. Called during shutdown so the
/// WAL checkpoint runs and the lockfile can be released cleanly.
pub async fn close_pools(pools: DbPools) {
    info!("Closing database connection pools");
    pools.write.close().await;
    pools.read.close().await;
    info!("Database connection pools closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_read_connections, 8);
        assert_eq!(config.connect_timeout_seconds, 30);
        assert_eq!(config.busy_timeout_seconds, 5);
    }

    #[test]
    fn test_database_config_clone() {
        let config = DatabaseConfig::default();
        let cloned = config.clone();
        assert_eq!(config.path, cloned.path);
        assert_eq!(config.max_read_connections, cloned.max_read_connections);
    }

    // Integration tests that open a real pool are in sparkq-core/tests/.
}
