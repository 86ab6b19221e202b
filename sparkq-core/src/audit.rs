/// Audit log hook
///
/// Every mutation the Store commits appends a row to `audit_log`. The core
/// only ever appends; nothing in the core reads these rows back — audit
/// log *consumption* is out of scope, the hook is ambient. Unlike
/// AxonTask's event log this carries no hash chain: there is no SparkQ
/// requirement for tamper evidence, only a record that something
/// happened.
use crate::error::StoreResult;
use crate::ids;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::Sqlite;
use tracing::debug;

/// Appends one audit record through the given executor. Generic over
/// `sqlx::Executor` so callers pass `&mut *tx` and get the audit insert
/// committed or rolled back atomically with the mutation it records,
/// rather than as a trailing, separately-fallible statement.
pub async fn record<'a, E>(
    executor: E,
    entity_type: &str,
    entity_id: &str,
    action: &str,
    actor: Option<&str>,
    detail: Option<JsonValue>,
) -> StoreResult<()>
where
    E: sqlx::Executor<'a, Database = Sqlite>,
{
    let id = ids::generate("aud_");
    let detail = detail.map(|d| d.to_string());

    sqlx::query(
        "INSERT INTO audit_log (id, entity_type, entity_id, action, actor, at, detail)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(entity_type)
    .bind(entity_id)
    .bind(action)
    .bind(actor)
    .bind(Utc::now())
    .bind(detail)
    .execute(executor)
    .await
    .map_err(crate::error::StoreError::from_sqlx)?;

    debug!(entity_type, entity_id, action, "audit record appended");
    Ok(())
}
