/// Task resource endpoints
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sparkq_core::models::task::{Task, TaskStatus};

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub queue_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

fn parse_task_status(raw: &str) -> ApiResult<TaskStatus> {
    TaskStatus::from_str(raw).ok_or_else(|| ApiError::bad_request(format!("unknown task status {raw}")))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TasksResponse>> {
    let status = query.status.as_deref().map(parse_task_status).transpose()?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let tasks = state
        .store
        .list_tasks(query.queue_id.as_deref(), status, limit, offset)
        .await?;
    Ok(Json(TasksResponse { tasks }))
}

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub queue_id: String,
    pub tool_name: String,
    pub task_class: Option<String>,
    pub payload: JsonValue,
    pub timeout: Option<i64>,
}

pub async fn enqueue(
    State(state): State<AppState>,
    Json(body): Json<EnqueueRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .scheduler
        .enqueue(
            &body.queue_id,
            &body.tool_name,
            body.task_class.as_deref(),
            body.payload,
            body.timeout,
        )
        .await?;
    Ok(Json(task))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Task>> {
    Ok(Json(state.store.get_task(&id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JsonValue>> {
    state.store.delete_task(&id).await?;
    Ok(Json(serde_json::json!({})))
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub worker_id: String,
}

/// `POST /api/queues/{queue_id}/claim` — the runner's normal FIFO path.
/// A missing task is not an error: returns 204 with no body.
pub async fn claim_by_queue(
    State(state): State<AppState>,
    Path(queue_id): Path<String>,
    Json(body): Json<ClaimRequest>,
) -> ApiResult<axum::response::Response> {
    use axum::response::IntoResponse;
    match state.scheduler.claim_by_queue(&queue_id, &body.worker_id).await? {
        Some(task) => Ok(Json(task).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// `POST /api/tasks/{id}/claim` — claims that exact task regardless of
/// queue position, bypassing FIFO. `Conflict` if it isn't `queued`.
pub async fn claim_by_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ClaimRequest>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.scheduler.claim_by_task(&id, &body.worker_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub result: Option<JsonValue>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .scheduler
        .complete(&id, body.result, body.stdout.as_deref(), body.stderr.as_deref())
        .await?;
    Ok(Json(task))
}

#[derive(Debug, Deserialize)]
pub struct FailRequest {
    pub error: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

pub async fn fail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<FailRequest>,
) -> ApiResult<Json<Task>> {
    if body.error.trim().is_empty() {
        return Err(ApiError::bad_request("error must not be empty"));
    }
    let task = state
        .scheduler
        .fail(&id, &body.error, body.stdout.as_deref(), body.stderr.as_deref())
        .await?;
    Ok(Json(task))
}

pub async fn requeue(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Task>> {
    Ok(Json(state.scheduler.requeue(&id).await?))
}
