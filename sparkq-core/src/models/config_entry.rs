/// Config-entry model
///
/// Mutable runtime settings keyed by `(namespace, key)`. Seeded from the
/// YAML config file on first run; the database is authoritative
/// thereafter. See `sparkq_core::config` for the resolution flow.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub namespace: String,
    pub key: String,
    pub value: JsonValue,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConfigEntryRow {
    pub namespace: String,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl TryFrom<ConfigEntryRow> for ConfigEntry {
    type Error = serde_json::Error;

    fn try_from(row: ConfigEntryRow) -> Result<Self, Self::Error> {
        Ok(ConfigEntry {
            namespace: row.namespace,
            key: row.key,
            value: serde_json::from_str(&row.value)?,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        })
    }
}
