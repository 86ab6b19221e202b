use super::Store;
use crate::audit;
use crate::error::{StoreError, StoreResult};
use crate::ids;
use crate::models::queue::Queue;
use crate::models::task::{Task, TaskRow, TaskStatus, AUTO_FAIL_ERROR};
use crate::models::task_class::TaskClass;
use crate::models::tool::Tool;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

fn row_to_task(row: TaskRow) -> StoreResult<Task> {
    row.try_into()
        .map_err(|e: serde_json::Error| StoreError::Invalid(e.to_string()))
}

impl Store {
    /// Enqueues a new task. Resolves the queue's existence and open state,
    /// the tool and task-class references, and the effective timeout, then
    /// inserts — all inside one transaction against the write pool, so a
    /// concurrent archive/end of the queue can't land between the check
    /// and the insert.
    pub async fn enqueue(
        &self,
        queue_id: &str,
        tool_name: &str,
        task_class: Option<&str>,
        payload: JsonValue,
        timeout_seconds: Option<i64>,
    ) -> StoreResult<Task> {
        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        let queue = sqlx::query_as::<_, Queue>("SELECT * FROM queues WHERE id = ?")
            .bind(queue_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("queue {queue_id} not found")))?;
        if queue.is_archived() {
            return Err(StoreError::Conflict(format!("queue {queue_id} is archived")));
        }
        if queue.is_ended() {
            return Err(StoreError::Conflict(format!("queue {queue_id} has ended")));
        }

        let tool = sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE name = ?")
            .bind(tool_name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("tool {tool_name} not found")))?;

        let task_class_name = task_class.unwrap_or(&tool.task_class).to_string();
        let task_class_row = sqlx::query_as::<_, TaskClass>(
            "SELECT * FROM task_classes WHERE name = ?",
        )
        .bind(&task_class_name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or_else(|| StoreError::NotFound(format!("task class {task_class_name} not found")))?;

        let timeout_seconds = match timeout_seconds {
            Some(t) if t > 0 => t,
            Some(_) => return Err(StoreError::Invalid("timeout_seconds must be positive".into())),
            None => task_class_row.default_timeout_seconds,
        };
        if timeout_seconds <= 0 {
            return Err(StoreError::Invalid(
                "resolved timeout_seconds must be positive".into(),
            ));
        }

        let mut friendly_code = ids::friendly_task_code(&queue.name);
        let id = ids::generate(ids::prefix::TASK);
        let created_at = Utc::now();
        let payload_text = payload.to_string();

        // Friendly codes only need to be unique within the queue; retry a
        // handful of times on a collision before giving up.
        let mut attempt = 0;
        loop {
            let result = sqlx::query(
                "INSERT INTO tasks
                    (id, queue_id, friendly_code, tool_name, task_class, payload, status,
                     timeout_seconds, attempts, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, 'queued', ?, 0, ?)",
            )
            .bind(&id)
            .bind(queue_id)
            .bind(&friendly_code)
            .bind(tool_name)
            .bind(&task_class_name)
            .bind(&payload_text)
            .bind(timeout_seconds)
            .bind(created_at)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(_) => break,
                Err(sqlx::Error::Database(ref db_err))
                    if db_err.is_unique_violation() && attempt < 4 =>
                {
                    friendly_code = ids::friendly_task_code(&queue.name);
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(StoreError::from_sqlx(e)),
            }
        }

        audit::record(&mut *tx, "task", &id, "enqueue", None, None).await?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        self.get_task(&id).await
    }

    pub async fn get_task(&self, id: &str) -> StoreResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("task {id} not found")))?;
        row_to_task(row)
    }

    /// Returns the single oldest `queued` task for the queue, ordered by
    /// `created_at` ASC then `id` ASC. Read-only; does not mutate.
    pub async fn next_queued_for_queue(&self, queue_id: &str) -> StoreResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT * FROM tasks
             WHERE queue_id = ? AND status = 'queued'
             ORDER BY created_at ASC, id ASC
             LIMIT 1",
        )
        .bind(queue_id)
        .fetch_optional(self.read_pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        row.map(row_to_task).transpose()
    }

    /// Atomically claims the oldest `queued` task in the queue for
    /// `worker_id`. Expressed as a single `UPDATE ... WHERE id = (SELECT
    /// ...)` plus the audit insert inside one transaction against the
    /// single-connection write pool, so SQLite's own locking — not an
    /// application mutex — serializes concurrent callers and a failed
    /// audit insert rolls back the claim instead of leaving it
    /// unreported. Returns `None` if the queue has no task available;
    /// that's not an error.
    pub async fn try_claim(&self, queue_id: &str, worker_id: &str) -> StoreResult<Option<Task>> {
        self.get_queue(queue_id).await?;

        let now = Utc::now();
        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE tasks
             SET status = 'running', claimed_at = ?, claimed_by = ?, attempts = attempts + 1
             WHERE id = (
                SELECT id FROM tasks
                WHERE queue_id = ? AND status = 'queued'
                ORDER BY created_at ASC, id ASC
                LIMIT 1
             )
             RETURNING *",
        )
        .bind(now)
        .bind(worker_id)
        .bind(queue_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        let Some(row) = row else {
            tx.commit().await.map_err(StoreError::from_sqlx)?;
            return Ok(None);
        };
        let task = row_to_task(row)?;

        audit::record(&mut *tx, "task", &task.id, "claim", Some(worker_id), None).await?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(Some(task))
    }

    /// Claims a specific task by id regardless of its position in the
    /// queue, as long as it is currently `queued`. This bypasses FIFO —
    /// the queue-level claim above remains the FIFO-respecting path for
    /// normal runner use.
    pub async fn claim_by_task(&self, task_id: &str, worker_id: &str) -> StoreResult<Task> {
        let now = Utc::now();
        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE tasks
             SET status = 'running', claimed_at = ?, claimed_by = ?, attempts = attempts + 1
             WHERE id = ? AND status = 'queued'
             RETURNING *",
        )
        .bind(now)
        .bind(worker_id)
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        let row = match row {
            Some(row) => row,
            None => {
                tx.commit().await.map_err(StoreError::from_sqlx)?;
                // Distinguish "doesn't exist" from "exists but not queued".
                self.get_task(task_id).await?;
                return Err(StoreError::Conflict(format!(
                    "task {task_id} is not queued"
                )));
            }
        };

        let task = row_to_task(row)?;
        audit::record(&mut *tx, "task", &task.id, "claim", Some(worker_id), None).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(task)
    }

    /// Transitions a `running` task to a terminal status. Refuses if the
    /// current status isn't `running`. The update and its audit record
    /// share one transaction so a failed audit insert can't leave a task
    /// claimed/finalized in the database while the caller sees an error.
    async fn finalize(
        &self,
        task_id: &str,
        status: TaskStatus,
        result: Option<JsonValue>,
        error: Option<&str>,
        stdout: Option<&str>,
        stderr: Option<&str>,
    ) -> StoreResult<Task> {
        let finished_at = Utc::now();
        let result_text = result.map(|r| r.to_string());

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE tasks
             SET status = ?, finished_at = ?, result = ?, error = ?, stdout = ?, stderr = ?
             WHERE id = ? AND status = 'running'
             RETURNING *",
        )
        .bind(status.as_str())
        .bind(finished_at)
        .bind(&result_text)
        .bind(error)
        .bind(stdout)
        .bind(stderr)
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        let row = match row {
            Some(row) => row,
            None => {
                tx.commit().await.map_err(StoreError::from_sqlx)?;
                self.get_task(task_id).await?;
                return Err(StoreError::Conflict(format!(
                    "task {task_id} is not running"
                )));
            }
        };

        let task = row_to_task(row)?;
        audit::record(&mut *tx, "task", &task.id, status.as_str(), None, None).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(task)
    }

    pub async fn complete_task(
        &self,
        task_id: &str,
        result: Option<JsonValue>,
        stdout: Option<&str>,
        stderr: Option<&str>,
    ) -> StoreResult<Task> {
        self.finalize(task_id, TaskStatus::Succeeded, result, None, stdout, stderr)
            .await
    }

    pub async fn fail_task(
        &self,
        task_id: &str,
        error: &str,
        stdout: Option<&str>,
        stderr: Option<&str>,
    ) -> StoreResult<Task> {
        self.finalize(task_id, TaskStatus::Failed, None, Some(error), stdout, stderr)
            .await
    }

    /// Resets a terminal task back to `queued`, clearing claim and
    /// outcome fields while preserving `attempts`. Requires the task to be
    /// `succeeded` or `failed`.
    pub async fn requeue(&self, task_id: &str) -> StoreResult<Task> {
        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE tasks
             SET status = 'queued', claimed_at = NULL, claimed_by = NULL,
                 finished_at = NULL, stale_warned_at = NULL, result = NULL, error = NULL
             WHERE id = ? AND status IN ('succeeded', 'failed')
             RETURNING *",
        )
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        let row = match row {
            Some(row) => row,
            None => {
                tx.commit().await.map_err(StoreError::from_sqlx)?;
                self.get_task(task_id).await?;
                return Err(StoreError::Conflict(format!(
                    "task {task_id} is not in a terminal state"
                )));
            }
        };

        let task = row_to_task(row)?;
        audit::record(&mut *tx, "task", &task.id, "requeue", None, None).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: &str) -> StoreResult<()> {
        self.get_task(task_id).await?;

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        audit::record(&mut *tx, "task", task_id, "delete", None, None).await?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    /// Lists tasks, optionally filtered by queue and/or status, newest
    /// first, with pagination.
    pub async fn list_tasks(
        &self,
        queue_id: Option<&str>,
        status: Option<TaskStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Task>> {
        let status_str = status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT * FROM tasks
             WHERE (?1 IS NULL OR queue_id = ?1)
               AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at DESC
             LIMIT ?3 OFFSET ?4",
        )
        .bind(queue_id)
        .bind(status_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.read_pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        rows.into_iter().map(row_to_task).collect()
    }

    /// Returns running tasks where `now − claimed_at ≥ timeout_seconds ×
    /// 2`. Consumed by the auto-fail reaper.
    pub async fn stale_candidates(&self, now: DateTime<Utc>) -> StoreResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT * FROM tasks
             WHERE status = 'running'
               AND claimed_at IS NOT NULL
               AND (unixepoch(?) - unixepoch(claimed_at)) >= timeout_seconds * 2
             ORDER BY claimed_at ASC",
        )
        .bind(now)
        .fetch_all(self.read_pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        rows.into_iter().map(row_to_task).collect()
    }

    /// Returns running tasks where `timeout_seconds ≤ now − claimed_at <
    /// timeout_seconds × 2` and no warning has been stamped yet. These are
    /// past their nominal deadline but not yet eligible for auto-fail.
    pub async fn warn_candidates(&self, now: DateTime<Utc>) -> StoreResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT * FROM tasks
             WHERE status = 'running'
               AND claimed_at IS NOT NULL
               AND stale_warned_at IS NULL
               AND (unixepoch(?) - unixepoch(claimed_at)) >= timeout_seconds
               AND (unixepoch(?) - unixepoch(claimed_at)) < timeout_seconds * 2
             ORDER BY claimed_at ASC",
        )
        .bind(now)
        .bind(now)
        .fetch_all(self.read_pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        rows.into_iter().map(row_to_task).collect()
    }

    /// Transitions one stale task to `failed` with the synthetic
    /// auto-fail error, preserving the original `claimed_at`. Guards on
    /// `status = 'running'` so a task completed between the candidate
    /// query and this call is left untouched.
    pub async fn auto_fail(&self, task_id: &str) -> StoreResult<bool> {
        let finished_at = Utc::now();

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        let result = sqlx::query(
            "UPDATE tasks SET status = 'failed', finished_at = ?, error = ?
             WHERE id = ? AND status = 'running'",
        )
        .bind(finished_at)
        .bind(AUTO_FAIL_ERROR)
        .bind(task_id)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        let affected = result.rows_affected() > 0;
        if affected {
            audit::record(&mut *tx, "task", task_id, "auto_fail", None, None).await?;
        }

        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(affected)
    }

    /// Stamps `stale_warned_at` once on a task between `1×timeout` and
    /// `2×timeout`. Purely advisory — no state change, no event emitted.
    pub async fn mark_stale_warned(&self, task_id: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE tasks SET stale_warned_at = ?
             WHERE id = ? AND status = 'running' AND stale_warned_at IS NULL",
        )
        .bind(Utc::now())
        .bind(task_id)
        .execute(self.write_pool())
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    /// Deletes terminal tasks whose `finished_at` predates `cutoff`,
    /// chunked at 500 rows per transaction so a large purge never holds
    /// the write lock long enough to starve the HTTP writer. Returns the
    /// total number of rows deleted.
    pub async fn purge_terminal(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        const CHUNK_SIZE: i64 = 500;
        let mut total_deleted = 0u64;

        loop {
            let result = sqlx::query(
                "DELETE FROM tasks WHERE id IN (
                    SELECT id FROM tasks
                    WHERE status IN ('succeeded', 'failed') AND finished_at < ?
                    LIMIT ?
                 )",
            )
            .bind(cutoff)
            .bind(CHUNK_SIZE)
            .execute(self.write_pool())
            .await
            .map_err(StoreError::from_sqlx)?;

            let deleted = result.rows_affected();
            total_deleted += deleted;

            if deleted < CHUNK_SIZE as u64 {
                break;
            }
        }

        Ok(total_deleted)
    }
}
