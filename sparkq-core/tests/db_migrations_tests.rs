/// Integration tests for the SQLite migration runner
use sparkq_core::db::migrations::{get_migration_status, run_migrations};
use sparkq_core::db::pool::{close_pools, create_pools, DatabaseConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_db_path() -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("sparkq-migrations-test-{}-{}-{}.db", std::process::id(), nanos, n))
}

fn cleanup(path: &PathBuf) {
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(format!("{}-wal", path.display()));
    let _ = std::fs::remove_file(format!("{}-shm", path.display()));
}

const TABLES: &[&str] = &[
    "projects",
    "sessions",
    "queues",
    "task_classes",
    "tools",
    "tasks",
    "config_entries",
    "audit_log",
];

#[tokio::test]
async fn test_run_migrations_creates_all_tables() {
    let path = temp_db_path();
    let config = DatabaseConfig {
        path: path.to_string_lossy().into_owned(),
        ..Default::default()
    };
    let pools = create_pools(config).await.expect("failed to create pools");

    run_migrations(&pools.write).await.expect("failed to run migrations");

    for table in TABLES {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pools.write)
        .await
        .expect("failed to query sqlite_master");
        assert!(exists, "expected table `{table}` to exist after migrations");
    }

    close_pools(pools).await;
    cleanup(&path);
}

#[tokio::test]
async fn test_run_migrations_is_idempotent() {
    let path = temp_db_path();
    let config = DatabaseConfig {
        path: path.to_string_lossy().into_owned(),
        ..Default::default()
    };
    let pools = create_pools(config).await.expect("failed to create pools");

    run_migrations(&pools.write).await.expect("first run failed");
    run_migrations(&pools.write).await.expect("second run should be a no-op, not an error");

    let status = get_migration_status(&pools.write).await.expect("failed to get status");
    assert_eq!(status.applied_migrations, 1);

    close_pools(pools).await;
    cleanup(&path);
}

#[tokio::test]
async fn test_migration_status_before_and_after() {
    let path = temp_db_path();
    let config = DatabaseConfig {
        path: path.to_string_lossy().into_owned(),
        ..Default::default()
    };
    let pools = create_pools(config).await.expect("failed to create pools");

    let before = get_migration_status(&pools.write).await.expect("failed to get status");
    assert_eq!(before.applied_migrations, 0);
    assert!(before.latest_version.is_none());

    run_migrations(&pools.write).await.expect("failed to run migrations");

    let after = get_migration_status(&pools.write).await.expect("failed to get status");
    assert_eq!(after.applied_migrations, 1);
    assert!(after.latest_version.is_some());

    close_pools(pools).await;
    cleanup(&path);
}

#[tokio::test]
async fn test_tasks_table_enforces_status_check_constraint() {
    let path = temp_db_path();
    let config = DatabaseConfig {
        path: path.to_string_lossy().into_owned(),
        ..Default::default()
    };
    let pools = create_pools(config).await.expect("failed to create pools");
    run_migrations(&pools.write).await.expect("failed to run migrations");

    let now = "2026-01-01T00:00:00Z";
    sqlx::query("INSERT INTO projects (id, name, created_at) VALUES ('proj_1', 'default', ?)")
        .bind(now)
        .execute(&pools.write)
        .await
        .expect("failed to insert project");
    sqlx::query(
        "INSERT INTO sessions (id, project_id, name, started_at) VALUES ('sess_1', 'proj_1', 's', ?)",
    )
    .bind(now)
    .execute(&pools.write)
    .await
    .expect("failed to insert session");
    sqlx::query(
        "INSERT INTO queues (id, session_id, name, created_at) VALUES ('queue_1', 'sess_1', 'q', ?)",
    )
    .bind(now)
    .execute(&pools.write)
    .await
    .expect("failed to insert queue");
    sqlx::query(
        "INSERT INTO task_classes (name, default_timeout_seconds) VALUES ('CLASS', 60)",
    )
    .execute(&pools.write)
    .await
    .expect("failed to insert task class");
    sqlx::query("INSERT INTO tools (name, task_class) VALUES ('tool', 'CLASS')")
        .execute(&pools.write)
        .await
        .expect("failed to insert tool");

    let result = sqlx::query(
        "INSERT INTO tasks
         (id, queue_id, friendly_code, tool_name, task_class, payload, status, timeout_seconds, created_at)
         VALUES ('task_1', 'queue_1', 'q-1', 'tool', 'CLASS', '{}', 'bogus-status', 60, ?)",
    )
    .bind(now)
    .execute(&pools.write)
    .await;

    assert!(result.is_err(), "CHECK constraint should reject an invalid task status");

    close_pools(pools).await;
    cleanup(&path);
}
