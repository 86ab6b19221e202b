/// `sparkq task` subcommands
use crate::client::{Client, ClientResult};
use clap::Subcommand;
use serde_json::json;

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Enqueue a new task on a queue
    Enqueue {
        queue_id: String,
        tool_name: String,
        /// Raw JSON payload, e.g. '{"cmd":"echo hi"}'
        payload: String,
        #[arg(long)]
        task_class: Option<String>,
        #[arg(long)]
        timeout: Option<i64>,
    },
    /// List tasks, optionally filtered
    Ls {
        #[arg(long)]
        queue_id: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },
    /// Claim the next queued task on a queue (FIFO). Prints nothing and
    /// exits cleanly if no task is available.
    Claim {
        queue_id: String,
        worker_id: String,
    },
    /// Claim a specific task by id, bypassing FIFO ordering
    ClaimTask {
        id: String,
        worker_id: String,
    },
    /// Mark a task succeeded
    Complete {
        id: String,
        #[arg(long)]
        result: Option<String>,
        #[arg(long)]
        stdout: Option<String>,
        #[arg(long)]
        stderr: Option<String>,
    },
    /// Mark a task failed
    Fail {
        id: String,
        error: String,
        #[arg(long)]
        stdout: Option<String>,
        #[arg(long)]
        stderr: Option<String>,
    },
    /// Reset a terminal task back to queued
    Requeue {
        id: String,
    },
    /// Delete a task
    Rm {
        id: String,
    },
}

fn parse_payload(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| json!({ "raw": raw }))
}

pub async fn run(client: &Client, cmd: TaskCommand) -> ClientResult<Option<serde_json::Value>> {
    match cmd {
        TaskCommand::Enqueue { queue_id, tool_name, payload, task_class, timeout } => client
            .post(
                "/api/tasks",
                &json!({
                    "queue_id": queue_id,
                    "tool_name": tool_name,
                    "task_class": task_class,
                    "payload": parse_payload(&payload),
                    "timeout": timeout,
                }),
            )
            .await
            .map(Some),
        TaskCommand::Ls { queue_id, status, limit, offset } => {
            let mut path = "/api/tasks".to_string();
            let mut params = Vec::new();
            if let Some(queue_id) = queue_id {
                params.push(format!("queue_id={queue_id}"));
            }
            if let Some(status) = status {
                params.push(format!("status={status}"));
            }
            if let Some(limit) = limit {
                params.push(format!("limit={limit}"));
            }
            if let Some(offset) = offset {
                params.push(format!("offset={offset}"));
            }
            if !params.is_empty() {
                path.push('?');
                path.push_str(&params.join("&"));
            }
            client.get(&path).await.map(Some)
        }
        TaskCommand::Claim { queue_id, worker_id } => client
            .post_optional(&format!("/api/queues/{queue_id}/claim"), &json!({ "worker_id": worker_id }))
            .await,
        TaskCommand::ClaimTask { id, worker_id } => client
            .post(&format!("/api/tasks/{id}/claim"), &json!({ "worker_id": worker_id }))
            .await
            .map(Some),
        TaskCommand::Complete { id, result, stdout, stderr } => client
            .post(
                &format!("/api/tasks/{id}/complete"),
                &json!({
                    "result": result.map(|r| parse_payload(&r)),
                    "stdout": stdout,
                    "stderr": stderr,
                }),
            )
            .await
            .map(Some),
        TaskCommand::Fail { id, error, stdout, stderr } => client
            .post(
                &format!("/api/tasks/{id}/fail"),
                &json!({ "error": error, "stdout": stdout, "stderr": stderr }),
            )
            .await
            .map(Some),
        TaskCommand::Requeue { id } => {
            client.post(&format!("/api/tasks/{id}/requeue"), &json!({})).await.map(Some)
        }
        TaskCommand::Rm { id } => client.delete(&format!("/api/tasks/{id}")).await.map(Some),
    }
}
