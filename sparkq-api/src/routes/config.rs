/// Runtime config-entry endpoints
///
/// Read/write access to the `config_entries` table that the config
/// resolver seeds on first run. Mutations here are database-authoritative
/// runtime overrides and get recorded in the audit log just like any
/// other mutation — `Store::set_config_entry` already does that.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sparkq_core::models::config_entry::ConfigEntry;

#[derive(Debug, Serialize)]
pub struct ConfigEntriesResponse {
    pub entries: Vec<ConfigEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ListConfigQuery {
    pub namespace: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListConfigQuery>,
) -> ApiResult<Json<ConfigEntriesResponse>> {
    let entries = state.store.list_config(query.namespace.as_deref()).await?;
    Ok(Json(ConfigEntriesResponse { entries }))
}

pub async fn get(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> ApiResult<Json<ConfigEntry>> {
    Ok(Json(state.store.get_config_entry(&namespace, &key).await?))
}

#[derive(Debug, Deserialize)]
pub struct SetConfigRequest {
    pub value: JsonValue,
    pub updated_by: String,
}

pub async fn set(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
    Json(body): Json<SetConfigRequest>,
) -> ApiResult<Json<ConfigEntry>> {
    if body.updated_by.trim().is_empty() {
        return Err(ApiError::bad_request("updated_by must not be empty"));
    }
    let entry = state
        .store
        .set_config_entry(&namespace, &key, body.value, &body.updated_by)
        .await?;
    Ok(Json(entry))
}
