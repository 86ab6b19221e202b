/// Database layer
///
/// Connection pooling and migrations for the embedded SQLite database.
///
/// # Modules
///
/// - `pool`: SQLite connection pool management, WAL mode, health checks
/// - `migrations`: migration runner wrapping `sqlx::migrate!`

pub mod migrations;
pub mod pool;
