/// Common test utilities for integration tests
///
/// Each test gets its own SQLite database file under the system temp
/// directory, migrated and seeded from scratch, with a real `AppState`
/// and router behind it — no mocking of the store layer.
use sparkq_api::app::{build_router, AppState};
use sparkq_api::lockfile::Lockfile;
use sparkq_core::config::FileConfig;
use sparkq_core::db::{migrations, pool};
use sparkq_core::store::Store;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_db_path() -> PathBuf {
    let n = DB_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "sparkq-test-{}-{}-{}.db",
        std::process::id(),
        nanos,
        n
    ))
}

/// Test context containing a fully wired app plus direct store access for
/// setup/assertions that don't need to go through HTTP.
pub struct TestContext {
    pub app: axum::Router,
    pub store: Store,
    db_path: PathBuf,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let db_path = unique_db_path();

        let lockfile = Lockfile::acquire(&db_path)
            .map_err(|e| anyhow::anyhow!("failed to acquire test lockfile: {e}"))?;

        let db_config = pool::DatabaseConfig {
            path: db_path.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let pools = pool::create_pools(db_config).await?;
        migrations::run_migrations(&pools.write).await?;

        let store = Store::new(pools);
        store.ensure_default_project().await?;

        // Baseline registry every test can rely on: one task class with a
        // short timeout (so stale/auto-fail tests don't need to sleep
        // minutes) and a tool bound to it.
        store
            .create_task_class("FAST_SCRIPT", 1, Some("used by integration tests"))
            .await?;
        store
            .create_tool("run-bash", "FAST_SCRIPT", Some("used by integration tests"))
            .await?;

        let config = FileConfig::default();
        let state = AppState::new(store.clone(), config, lockfile);
        let app = build_router(state);

        Ok(Self { app, store, db_path })
    }

    /// Convenience for setting up a session + queue outside of HTTP, so
    /// tests that are really about task transitions don't have to
    /// round-trip through the router just to get a queue id.
    pub async fn seed_session_and_queue(&self, queue_name: &str) -> anyhow::Result<(String, String)> {
        let session = self.store.create_session("test session").await?;
        let queue = self
            .store
            .create_queue(&session.id, queue_name, None, None)
            .await?;
        Ok((session.id, queue.id))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_path.display()));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_path.display()));
    }
}

/// Parses a response body into JSON, panicking with the status and raw
/// body on anything that isn't valid JSON — makes failing assertions in
/// the tests below show the actual server response instead of a generic
/// "expected X got Y".
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("response ({status}) was not valid JSON: {e}: {bytes:?}"))
}
