/// Integration tests for the SparkQ API
///
/// These exercise the full stack — router, Scheduler, Store, and a real
/// SQLite database file — end to end. No mocking: every test spins up
/// its own database via `common::TestContext`.
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, TestContext};
use serde_json::json;
use tower::Service as _;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_check_reports_ok() {
    let mut ctx = TestContext::new().await.unwrap();
    let response = ctx.app.call(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_version_endpoint() {
    let mut ctx = TestContext::new().await.unwrap();
    let response = ctx.app.call(empty_request("GET", "/api/version")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_stats_endpoint_counts_entities() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("stats-queue").await.unwrap();
    ctx.store
        .enqueue(&queue_id, "run-bash", None, json!({"cmd": "echo hi"}), None)
        .await
        .unwrap();

    let response = ctx.app.call(empty_request("GET", "/api/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_tasks"], 1);
    assert_eq!(body["by_status"]["queued"], 1);
}

/// S1: session → queue → enqueue → claim → complete, the full happy path.
#[tokio::test]
async fn test_full_task_lifecycle_via_http() {
    let mut ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .call(json_request("POST", "/api/sessions", json!({"name": "release-1"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session = body_json(response).await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let response = ctx
        .app
        .call(json_request(
            "POST",
            "/api/queues",
            json!({"session_id": session_id, "name": "build"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let queue = body_json(response).await;
    let queue_id = queue["id"].as_str().unwrap().to_string();
    assert_eq!(queue["status"], "idle");

    let response = ctx
        .app
        .call(json_request(
            "POST",
            "/api/tasks",
            json!({
                "queue_id": queue_id,
                "tool_name": "run-bash",
                "payload": {"cmd": "echo hi"}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await;
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["status"], "queued");
    assert_eq!(task["attempts"], 0);

    let response = ctx
        .app
        .call(json_request(
            "POST",
            &format!("/api/queues/{queue_id}/claim"),
            json!({"worker_id": "worker-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let claimed = body_json(response).await;
    assert_eq!(claimed["id"], task_id);
    assert_eq!(claimed["status"], "running");
    assert_eq!(claimed["attempts"], 1);

    let response = ctx
        .app
        .call(json_request(
            "POST",
            &format!("/api/tasks/{task_id}/complete"),
            json!({"result": {"ok": true}, "stdout": "hi\n", "stderr": null}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let completed = body_json(response).await;
    assert_eq!(completed["status"], "succeeded");
    assert_eq!(completed["result"]["ok"], true);
}

/// Claiming a queue with nothing queued is not an error — 204, no body.
#[tokio::test]
async fn test_claim_on_empty_queue_returns_204() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("empty-queue").await.unwrap();

    let response = ctx
        .app
        .call(json_request(
            "POST",
            &format!("/api/queues/{queue_id}/claim"),
            json!({"worker_id": "worker-1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

/// Three tasks enqueued in order must be claimed in the same order,
/// regardless of which one a racing second worker asks for.
#[tokio::test]
async fn test_claim_is_fifo_under_contention() {
    let ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("fifo-queue").await.unwrap();

    let mut ids = Vec::new();
    for i in 0..3 {
        let task = ctx
            .store
            .enqueue(&queue_id, "run-bash", None, json!({"seq": i}), None)
            .await
            .unwrap();
        ids.push(task.id);
    }

    let first = ctx.store.try_claim(&queue_id, "worker-a").await.unwrap().unwrap();
    let second = ctx.store.try_claim(&queue_id, "worker-b").await.unwrap().unwrap();
    let third = ctx.store.try_claim(&queue_id, "worker-a").await.unwrap().unwrap();
    let none = ctx.store.try_claim(&queue_id, "worker-a").await.unwrap();

    assert_eq!(first.id, ids[0]);
    assert_eq!(second.id, ids[1]);
    assert_eq!(third.id, ids[2]);
    assert!(none.is_none());
}

/// Completing a task that isn't running is a 409 with the wrong-state code.
#[tokio::test]
async fn test_complete_on_queued_task_returns_409() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("wrong-state-queue").await.unwrap();
    let task = ctx
        .store
        .enqueue(&queue_id, "run-bash", None, json!({}), None)
        .await
        .unwrap();

    let response = ctx
        .app
        .call(json_request(
            "POST",
            &format!("/api/tasks/{}/complete", task.id),
            json!({"result": null, "stdout": null, "stderr": null}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "task.wrong_state");
}

/// Enqueuing onto an archived queue is rejected with a stable code.
#[tokio::test]
async fn test_enqueue_on_archived_queue_returns_409() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("archive-me").await.unwrap();

    let response = ctx
        .app
        .call(empty_request("PUT", &format!("/api/queues/{queue_id}/archive")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .call(json_request(
            "POST",
            "/api/tasks",
            json!({"queue_id": queue_id, "tool_name": "run-bash", "payload": {}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "queue.archived");
}

/// Requeuing a terminal task resets it to queued and a later claim bumps
/// `attempts` again — the requeue cycle does not reset the attempt count.
#[tokio::test]
async fn test_requeue_cycle_preserves_and_increments_attempts() {
    let ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("requeue-queue").await.unwrap();
    let task = ctx
        .store
        .enqueue(&queue_id, "run-bash", None, json!({}), None)
        .await
        .unwrap();

    let claimed = ctx.store.try_claim(&queue_id, "worker-1").await.unwrap().unwrap();
    assert_eq!(claimed.attempts, 1);

    ctx.store.fail_task(&task.id, "boom", None, None).await.unwrap();

    let requeued = ctx.store.requeue(&task.id).await.unwrap();
    assert_eq!(requeued.status, sparkq_core::models::task::TaskStatus::Queued);
    assert_eq!(requeued.attempts, 1);

    let reclaimed = ctx.store.try_claim(&queue_id, "worker-2").await.unwrap().unwrap();
    assert_eq!(reclaimed.attempts, 2);
}

/// Requeuing a task that's still running (not terminal) is a conflict.
#[tokio::test]
async fn test_requeue_on_running_task_is_conflict() {
    let ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("requeue-running").await.unwrap();
    let task = ctx
        .store
        .enqueue(&queue_id, "run-bash", None, json!({}), None)
        .await
        .unwrap();
    ctx.store.try_claim(&queue_id, "worker-1").await.unwrap();

    let err = ctx.store.requeue(&task.id).await.unwrap_err();
    assert!(matches!(err, sparkq_core::error::StoreError::Conflict(_)));
}

/// Deleting a session cascades through its queues and tasks.
#[tokio::test]
async fn test_delete_session_cascades_to_queues_and_tasks() {
    let ctx = TestContext::new().await.unwrap();
    let (session_id, queue_id) = ctx.seed_session_and_queue("cascade-queue").await.unwrap();
    let task = ctx
        .store
        .enqueue(&queue_id, "run-bash", None, json!({}), None)
        .await
        .unwrap();

    ctx.store.delete_session(&session_id).await.unwrap();

    assert!(ctx.store.get_queue(&queue_id).await.is_err());
    assert!(ctx.store.get_task(&task.id).await.is_err());
}

/// The auto-fail reaper sweeps a task claimed longer ago than 2x its
/// timeout. `FAST_SCRIPT` has a 1-second timeout, so sleeping past 2
/// seconds puts the task well into stale-candidate territory.
#[tokio::test]
async fn test_sweep_stale_auto_fails_after_timeout_x2() {
    let ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("timeout-queue").await.unwrap();
    let task = ctx
        .store
        .enqueue(&queue_id, "run-bash", None, json!({}), None)
        .await
        .unwrap();
    ctx.store.try_claim(&queue_id, "worker-1").await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(2200)).await;

    let scheduler = sparkq_core::scheduler::Scheduler::new(ctx.store.clone());
    let failed_count = scheduler.sweep_stale().await.unwrap();
    assert_eq!(failed_count, 1);

    let task = ctx.store.get_task(&task.id).await.unwrap();
    assert_eq!(task.status, sparkq_core::models::task::TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some(sparkq_core::models::task::AUTO_FAIL_ERROR));
}

/// Between 1x and 2x timeout a task is stamped with a one-time advisory
/// warning but left running — not failed yet.
#[tokio::test]
async fn test_sweep_stale_warns_before_auto_failing() {
    let ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("warn-queue").await.unwrap();
    let task = ctx
        .store
        .enqueue(&queue_id, "run-bash", None, json!({}), None)
        .await
        .unwrap();
    ctx.store.try_claim(&queue_id, "worker-1").await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(1200)).await;

    let scheduler = sparkq_core::scheduler::Scheduler::new(ctx.store.clone());
    let failed_count = scheduler.sweep_stale().await.unwrap();
    assert_eq!(failed_count, 0);

    let task = ctx.store.get_task(&task.id).await.unwrap();
    assert_eq!(task.status, sparkq_core::models::task::TaskStatus::Running);
    assert!(task.stale_warned_at.is_some());
}

/// Purge only removes terminal tasks older than the cutoff.
#[tokio::test]
async fn test_purge_terminal_respects_cutoff() {
    let ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("purge-queue").await.unwrap();
    let old_task = ctx
        .store
        .enqueue(&queue_id, "run-bash", None, json!({}), None)
        .await
        .unwrap();
    ctx.store.try_claim(&queue_id, "worker-1").await.unwrap();
    ctx.store.complete_task(&old_task.id, None, None, None).await.unwrap();

    let still_queued = ctx
        .store
        .enqueue(&queue_id, "run-bash", None, json!({}), None)
        .await
        .unwrap();

    // Cutoff in the future: the just-completed task is older than it.
    let cutoff = chrono::Utc::now() + chrono::Duration::seconds(60);
    let deleted = ctx.store.purge_terminal(cutoff).await.unwrap();
    assert_eq!(deleted, 1);

    assert!(ctx.store.get_task(&old_task.id).await.is_err());
    assert!(ctx.store.get_task(&still_queued.id).await.is_ok());
}

/// A task not found returns a clean 404 with a JSON body, not a raw 500.
#[tokio::test]
async fn test_get_unknown_task_returns_404() {
    let mut ctx = TestContext::new().await.unwrap();
    let response = ctx
        .app
        .call(empty_request("GET", "/api/tasks/tsk_doesnotexist"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "not_found");
}

/// Claim-by-task bypasses FIFO but still refuses a task that's already
/// running.
#[tokio::test]
async fn test_claim_by_task_conflict_when_already_running() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_, queue_id) = ctx.seed_session_and_queue("direct-claim-queue").await.unwrap();
    let task = ctx
        .store
        .enqueue(&queue_id, "run-bash", None, json!({}), None)
        .await
        .unwrap();
    ctx.store.try_claim(&queue_id, "worker-1").await.unwrap();

    let response = ctx
        .app
        .call(json_request(
            "POST",
            &format!("/api/tasks/{}/claim", task.id),
            json!({"worker_id": "worker-2"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "task.wrong_state");
}

/// `PUT` on a queue's `instructions` with an explicit `null` clears the
/// field rather than leaving it untouched.
#[tokio::test]
async fn test_update_queue_can_clear_instructions() {
    let mut ctx = TestContext::new().await.unwrap();
    let session = ctx.store.create_session("clear-test").await.unwrap();
    let queue = ctx
        .store
        .create_queue(&session.id, "clear-queue", Some("do the thing"), None)
        .await
        .unwrap();

    let response = ctx
        .app
        .call(json_request(
            "PUT",
            &format!("/api/queues/{}", queue.id),
            json!({"instructions": null}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["instructions"].is_null());

    // Omitting the field entirely leaves it at whatever it currently is.
    let response = ctx
        .app
        .call(json_request("PUT", &format!("/api/queues/{}", queue.id), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["instructions"].is_null());
}
