/// Queue resource endpoints
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sparkq_core::models::queue::{Queue, QueueStatus};

/// A queue plus its resolved status, the shape every queue endpoint
/// returns (derived status is never stored, so it's always attached at
/// the response boundary rather than on the model itself).
#[derive(Debug, Serialize)]
pub struct QueueView {
    #[serde(flatten)]
    pub queue: Queue,
    pub status: QueueStatus,
}

#[derive(Debug, Serialize)]
pub struct QueuesResponse {
    pub queues: Vec<QueueView>,
}

#[derive(Debug, Deserialize)]
pub struct CreateQueueRequest {
    pub session_id: String,
    pub name: String,
    pub instructions: Option<String>,
    pub model_profile: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQueueRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub instructions: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub model_profile: Option<Option<String>>,
}

/// Distinguishes "field omitted" from "field explicitly set to null" so a
/// PUT can clear `instructions`/`model_profile` without requiring a
/// special sentinel value.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

#[derive(Debug, Deserialize)]
pub struct ListQueuesQuery {
    pub session_id: Option<String>,
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> ApiResult<QueueStatus> {
    match raw {
        "archived" => Ok(QueueStatus::Archived),
        "ended" => Ok(QueueStatus::Ended),
        "active" => Ok(QueueStatus::Active),
        "planned" => Ok(QueueStatus::Planned),
        "idle" => Ok(QueueStatus::Idle),
        other => Err(ApiError::bad_request(format!("unknown queue status {other}"))),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQueuesQuery>,
) -> ApiResult<Json<QueuesResponse>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let queues = state
        .store
        .list_queues(query.session_id.as_deref(), status)
        .await?
        .into_iter()
        .map(|(queue, status)| QueueView { queue, status })
        .collect();
    Ok(Json(QueuesResponse { queues }))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateQueueRequest>,
) -> ApiResult<Json<QueueView>> {
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    let queue = state
        .store
        .create_queue(
            &body.session_id,
            &body.name,
            body.instructions.as_deref(),
            body.model_profile.as_deref(),
        )
        .await?;
    let status = state.store.queue_status(&queue).await?;
    Ok(Json(QueueView { queue, status }))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<QueueView>> {
    let queue = state.store.get_queue(&id).await?;
    let status = state.store.queue_status(&queue).await?;
    Ok(Json(QueueView { queue, status }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateQueueRequest>,
) -> ApiResult<Json<QueueView>> {
    let queue = state
        .store
        .update_queue(&id, body.instructions, body.model_profile)
        .await?;
    let status = state.store.queue_status(&queue).await?;
    Ok(Json(QueueView { queue, status }))
}

pub async fn end(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<QueueView>> {
    let queue = state.store.end_queue(&id).await?;
    let status = state.store.queue_status(&queue).await?;
    Ok(Json(QueueView { queue, status }))
}

pub async fn archive(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<QueueView>> {
    let queue = state.store.archive_queue(&id).await?;
    let status = state.store.queue_status(&queue).await?;
    Ok(Json(QueueView { queue, status }))
}

pub async fn unarchive(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<QueueView>> {
    let queue = state.store.unarchive_queue(&id).await?;
    let status = state.store.queue_status(&queue).await?;
    Ok(Json(QueueView { queue, status }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.store.delete_queue(&id).await?;
    Ok(Json(serde_json::json!({})))
}
