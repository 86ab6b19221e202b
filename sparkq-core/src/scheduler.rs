/// Scheduler: stateless façade over the Store
///
/// Routes hold a `Scheduler`, not a `Store`, so the HTTP layer never has to
/// know which store methods compose into a single logical operation (for
/// instance that "fail" and "complete" are the same finalize path with a
/// different outcome). The reapers hold one too.
use crate::error::StoreResult;
use crate::models::task::{Task, TaskStatus};
use crate::store::Store;
use chrono::Utc;
use serde_json::Value as JsonValue;

#[derive(Clone)]
pub struct Scheduler {
    store: Store,
}

impl Scheduler {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn enqueue(
        &self,
        queue_id: &str,
        tool_name: &str,
        task_class: Option<&str>,
        payload: JsonValue,
        timeout_seconds: Option<i64>,
    ) -> StoreResult<Task> {
        self.store
            .enqueue(queue_id, tool_name, task_class, payload, timeout_seconds)
            .await
    }

    /// Claims the oldest queued task in `queue_id` for `worker_id`, FIFO.
    pub async fn claim_by_queue(&self, queue_id: &str, worker_id: &str) -> StoreResult<Option<Task>> {
        self.store.try_claim(queue_id, worker_id).await
    }

    /// Claims a specific task regardless of queue position.
    pub async fn claim_by_task(&self, task_id: &str, worker_id: &str) -> StoreResult<Task> {
        self.store.claim_by_task(task_id, worker_id).await
    }

    pub async fn complete(
        &self,
        task_id: &str,
        result: Option<JsonValue>,
        stdout: Option<&str>,
        stderr: Option<&str>,
    ) -> StoreResult<Task> {
        self.store.complete_task(task_id, result, stdout, stderr).await
    }

    pub async fn fail(
        &self,
        task_id: &str,
        error: &str,
        stdout: Option<&str>,
        stderr: Option<&str>,
    ) -> StoreResult<Task> {
        self.store.fail_task(task_id, error, stdout, stderr).await
    }

    pub async fn requeue(&self, task_id: &str) -> StoreResult<Task> {
        self.store.requeue(task_id).await
    }

    /// Sweeps `running` tasks whose deadline (`timeout_seconds`) has
    /// passed once, stamping a one-time advisory warning, and tasks whose
    /// deadline has passed twice over, auto-failing them. Called by the
    /// auto-fail reaper on its poll interval; returns the number of tasks
    /// actually transitioned to `failed`.
    pub async fn sweep_stale(&self) -> StoreResult<u64> {
        let now = Utc::now();

        for task in self.store.warn_candidates(now).await? {
            self.store.mark_stale_warned(&task.id).await?;
        }

        let candidates = self.store.stale_candidates(now).await?;
        let mut failed = 0u64;

        for task in candidates {
            if task.status != TaskStatus::Running {
                continue;
            }
            if self.store.auto_fail(&task.id).await? {
                failed += 1;
            }
        }

        Ok(failed)
    }
}

#[cfg(test)]
mod tests {
    // Scheduler is a thin façade; its behavior is exercised end to end in
    // sparkq-api's integration tests against a real SQLite store.
}
