use super::Store;
use crate::audit;
use crate::error::{StoreError, StoreResult};
use crate::models::config_entry::{ConfigEntry, ConfigEntryRow};
use chrono::Utc;
use serde_json::Value as JsonValue;

impl Store {
    pub async fn get_config_entry(&self, namespace: &str, key: &str) -> StoreResult<ConfigEntry> {
        let row = sqlx::query_as::<_, ConfigEntryRow>(
            "SELECT * FROM config_entries WHERE namespace = ? AND key = ?",
        )
        .bind(namespace)
        .bind(key)
        .fetch_optional(self.read_pool())
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or_else(|| StoreError::NotFound(format!("config entry {namespace}.{key} not found")))?;

        row.try_into()
            .map_err(|e: serde_json::Error| StoreError::Invalid(e.to_string()))
    }

    pub async fn list_config(&self, namespace: Option<&str>) -> StoreResult<Vec<ConfigEntry>> {
        let rows = if let Some(namespace) = namespace {
            sqlx::query_as::<_, ConfigEntryRow>(
                "SELECT * FROM config_entries WHERE namespace = ? ORDER BY key ASC",
            )
            .bind(namespace)
            .fetch_all(self.read_pool())
            .await
        } else {
            sqlx::query_as::<_, ConfigEntryRow>(
                "SELECT * FROM config_entries ORDER BY namespace ASC, key ASC",
            )
            .fetch_all(self.read_pool())
            .await
        }
        .map_err(StoreError::from_sqlx)?;

        rows.into_iter()
            .map(|row| row.try_into().map_err(|e: serde_json::Error| StoreError::Invalid(e.to_string())))
            .collect()
    }

    /// Upserts a config entry and records who changed it. Callers that
    /// cache config values must invalidate on this call.
    pub async fn set_config_entry(
        &self,
        namespace: &str,
        key: &str,
        value: JsonValue,
        updated_by: &str,
    ) -> StoreResult<ConfigEntry> {
        let now = Utc::now();
        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query(
            "INSERT INTO config_entries (namespace, key, value, updated_at, updated_by)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by",
        )
        .bind(namespace)
        .bind(key)
        .bind(value.to_string())
        .bind(now)
        .bind(updated_by)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        audit::record(
            &mut *tx,
            "config_entry",
            &format!("{namespace}.{key}"),
            "set",
            Some(updated_by),
            Some(value.clone()),
        )
        .await?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(ConfigEntry {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value,
            updated_at: now,
            updated_by: updated_by.to_string(),
        })
    }
}
