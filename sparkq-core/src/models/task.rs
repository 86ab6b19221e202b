/// Task model
///
/// A Task is the atomic unit of work: it carries an opaque JSON payload, a
/// tool reference, a task-class timeout profile, and a status. The core
/// never executes tools; it only tracks these state transitions.
///
/// # State machine
///
/// ```text
///          enqueue
///   ·───────────────→ QUEUED
///   │                   │   claim
///   │                   ↓
///   │                RUNNING ──complete──→ SUCCEEDED
///   │                   │  ─────fail────→ FAILED
///   │                   │  ──auto-fail──→ FAILED  (timeout×2)
///   │                                          │
///   │               requeue ←──────────────────┤
///   └─────────────────────────────────────── rerun
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Task execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(TaskStatus::Queued),
            "running" => Some(TaskStatus::Running),
            "succeeded" => Some(TaskStatus::Succeeded),
            "failed" => Some(TaskStatus::Failed),
            _ => None,
        }
    }

    /// A task in a terminal status has finished one way or another.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub queue_id: String,
    pub friendly_code: String,
    pub tool_name: String,
    pub task_class: String,
    pub payload: JsonValue,
    pub status: TaskStatus,
    pub timeout_seconds: i64,
    pub attempts: i64,
    pub result: Option<JsonValue>,
    pub error: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub stale_warned_at: Option<DateTime<Utc>>,
    pub claimed_by: Option<String>,
}

/// Raw row shape as stored by sqlx — `payload`/`result` are persisted as
/// TEXT containing JSON and `status` as TEXT, so the row is decoded through
/// this intermediate type and converted with `TryFrom`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: String,
    pub queue_id: String,
    pub friendly_code: String,
    pub tool_name: String,
    pub task_class: String,
    pub payload: String,
    pub status: String,
    pub timeout_seconds: i64,
    pub attempts: i64,
    pub result: Option<String>,
    pub error: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub stale_warned_at: Option<DateTime<Utc>>,
    pub claimed_by: Option<String>,
}

impl TryFrom<TaskRow> for Task {
    type Error = serde_json::Error;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: row.id,
            queue_id: row.queue_id,
            friendly_code: row.friendly_code,
            tool_name: row.tool_name,
            task_class: row.task_class,
            payload: serde_json::from_str(&row.payload)?,
            status: TaskStatus::from_str(&row.status).unwrap_or(TaskStatus::Queued),
            timeout_seconds: row.timeout_seconds,
            attempts: row.attempts,
            result: row
                .result
                .map(|r| serde_json::from_str(&r))
                .transpose()?,
            error: row.error,
            stdout: row.stdout,
            stderr: row.stderr,
            created_at: row.created_at,
            claimed_at: row.claimed_at,
            finished_at: row.finished_at,
            stale_warned_at: row.stale_warned_at,
            claimed_by: row.claimed_by,
        })
    }
}

/// Synthetic error message stamped on a task the auto-fail reaper reaps.
pub const AUTO_FAIL_ERROR: &str = "auto-failed after timeout × 2";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            TaskStatus::Queued,
            TaskStatus::Running,
            TaskStatus::Succeeded,
            TaskStatus::Failed,
        ] {
            assert_eq!(TaskStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(!TaskStatus::Queued.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_task_row_conversion() {
        let row = TaskRow {
            id: "tsk_1".into(),
            queue_id: "que_1".into(),
            friendly_code: "BUILD-0001".into(),
            tool_name: "run-bash".into(),
            task_class: "FAST_SCRIPT".into(),
            payload: "{\"cmd\":\"echo hi\"}".into(),
            status: "queued".into(),
            timeout_seconds: 30,
            attempts: 0,
            result: None,
            error: None,
            stdout: None,
            stderr: None,
            created_at: Utc::now(),
            claimed_at: None,
            finished_at: None,
            stale_warned_at: None,
            claimed_by: None,
        };

        let task: Task = row.try_into().unwrap();
        assert_eq!(task.status, TaskStatus::Queued);
        assert_eq!(task.payload["cmd"], "echo hi");
    }
}
