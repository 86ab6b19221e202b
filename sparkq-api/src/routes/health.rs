/// Health and version endpoints
use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let healthy = state.store.health_check().await.is_ok();

    Ok(Json(HealthResponse {
        status: if healthy { "ok".to_string() } else { "degraded".to_string() },
        build_id: sparkq_core::VERSION.to_string(),
    }))
}

pub async fn version() -> Json<Value> {
    Json(json!({ "version": sparkq_core::VERSION }))
}
