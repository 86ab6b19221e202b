/// Configuration resolver
///
/// Two-stage resolution: a YAML file loaded at startup with the `config`
/// crate seeds defaults; thereafter the database's `config_entries` table
/// (plus the `task_classes`/`tools` tables for registry sections) is
/// authoritative. Runtime reads never consult the file again.
///
/// Resolution order for the file path: `SPARKQ_CONFIG` env var →
/// `sparkq.yml` in the current directory → `sparkq.yml` at the project
/// root (the parent of the database directory, by convention the
/// workspace root when running from `cargo run`).
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ENV_CONFIG_PATH: &str = "SPARKQ_CONFIG";
const SEED_MARKER_NAMESPACE: &str = "system";
const SEED_MARKER_KEY: &str = "seeded";
const SEEDED_BY: &str = "config-resolver";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5005
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_db_mode")]
    pub mode: String,
}

fn default_db_path() -> String {
    "sparkq/data/sparkq.db".to_string()
}
fn default_db_mode() -> String {
    "wal".to_string()
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            mode: default_db_mode(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeSection {
    #[serde(default = "default_retention_days")]
    pub older_than_days: u32,
}

fn default_retention_days() -> u32 {
    3
}

impl Default for PurgeSection {
    fn default() -> Self {
        Self {
            older_than_days: default_retention_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRunnerSection {
    #[serde(default = "default_auto_fail_interval")]
    pub auto_fail_interval_seconds: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

fn default_auto_fail_interval() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    30
}

impl Default for QueueRunnerSection {
    fn default() -> Self {
        Self {
            auto_fail_interval_seconds: default_auto_fail_interval(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// `task_classes.<NAME>.timeout` seed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskClassSeed {
    pub timeout: i64,
    pub description: Option<String>,
}

/// `tools.<name>.{description, task_class}` seed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSeed {
    pub task_class: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub purge: PurgeSection,
    #[serde(default)]
    pub queue_runner: QueueRunnerSection,
    #[serde(default)]
    pub task_classes: HashMap<String, TaskClassSeed>,
    #[serde(default)]
    pub tools: HashMap<String, ToolSeed>,
}

/// Resolves the YAML config file path: `SPARKQ_CONFIG` env var, then
/// `sparkq.yml` in the current directory, then the project root. Returns
/// `None` if no candidate exists — callers fall back to
/// `FileConfig::default()`.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_candidate = Path::new("sparkq.yml");
    if cwd_candidate.exists() {
        return Some(cwd_candidate.to_path_buf());
    }

    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let root_candidate = Path::new(&manifest_dir).join("sparkq.yml");
        if root_candidate.exists() {
            return Some(root_candidate);
        }
    }

    None
}

impl FileConfig {
    /// Loads the YAML config at the resolved path, falling back to
    /// built-in defaults when no file is found.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        match resolve_config_path() {
            Some(path) => {
                info!(path = %path.display(), "loading SparkQ config file");
                let settings = config::Config::builder()
                    .add_source(config::File::from(path))
                    .build()?;
                Ok(settings.try_deserialize()?)
            }
            None => {
                debug!("no config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Seeds `config_entries`, `task_classes`, and `tools` from the file
/// config on first run only; checked via a `seeded` marker row in
/// `config_entries`. Subsequent runs leave the database untouched here —
/// all further reads go through the Store.
pub async fn seed_if_needed(pool: &SqlitePool, file_config: &FileConfig) -> anyhow::Result<()> {
    let already_seeded: Option<(String,)> = sqlx::query_as(
        "SELECT value FROM config_entries WHERE namespace = ? AND key = ?",
    )
    .bind(SEED_MARKER_NAMESPACE)
    .bind(SEED_MARKER_KEY)
    .fetch_optional(pool)
    .await?;

    if already_seeded.is_some() {
        debug!("config already seeded, skipping");
        return Ok(());
    }

    info!("seeding database config from file config");
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    upsert_entry(&mut tx, "server", "host", json!(file_config.server.host), now).await?;
    upsert_entry(&mut tx, "server", "port", json!(file_config.server.port), now).await?;
    upsert_entry(&mut tx, "database", "path", json!(file_config.database.path), now).await?;
    upsert_entry(&mut tx, "database", "mode", json!(file_config.database.mode), now).await?;
    upsert_entry(
        &mut tx,
        "purge",
        "older_than_days",
        json!(file_config.purge.older_than_days),
        now,
    )
    .await?;
    upsert_entry(
        &mut tx,
        "queue_runner",
        "auto_fail_interval_seconds",
        json!(file_config.queue_runner.auto_fail_interval_seconds),
        now,
    )
    .await?;
    upsert_entry(
        &mut tx,
        "queue_runner",
        "poll_interval",
        json!(file_config.queue_runner.poll_interval),
        now,
    )
    .await?;

    for (name, seed) in &file_config.task_classes {
        sqlx::query(
            "INSERT OR IGNORE INTO task_classes (name, default_timeout_seconds, description)
             VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(seed.timeout)
        .bind(&seed.description)
        .execute(&mut *tx)
        .await?;
    }

    for (name, seed) in &file_config.tools {
        sqlx::query(
            "INSERT OR IGNORE INTO tools (name, task_class, description) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(&seed.task_class)
        .bind(&seed.description)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "INSERT INTO config_entries (namespace, key, value, updated_at, updated_by)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(SEED_MARKER_NAMESPACE)
    .bind(SEED_MARKER_KEY)
    .bind(json!(true).to_string())
    .bind(now)
    .bind(SEEDED_BY)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("database config seeded");
    Ok(())
}

async fn upsert_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    namespace: &str,
    key: &str,
    value: serde_json::Value,
    now: chrono::DateTime<Utc>,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO config_entries (namespace, key, value, updated_at, updated_by)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(namespace, key) DO NOTHING",
    )
    .bind(namespace)
    .bind(key)
    .bind(value.to_string())
    .bind(now)
    .bind(SEEDED_BY)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_section() {
        let server = ServerSection::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 5005);
    }

    #[test]
    fn test_default_purge_section() {
        assert_eq!(PurgeSection::default().older_than_days, 3);
    }

    #[test]
    fn test_default_queue_runner_section() {
        let qr = QueueRunnerSection::default();
        assert_eq!(qr.auto_fail_interval_seconds, 30);
        assert_eq!(qr.poll_interval, 30);
    }

    #[test]
    fn test_file_config_default_is_empty_registries() {
        let config = FileConfig::default();
        assert!(config.task_classes.is_empty());
        assert!(config.tools.is_empty());
    }
}
