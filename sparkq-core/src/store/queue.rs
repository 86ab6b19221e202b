use super::Store;
use crate::audit;
use crate::error::{StoreError, StoreResult};
use crate::ids;
use crate::models::queue::{Queue, QueueStatus};
use chrono::Utc;

impl Store {
    pub async fn create_queue(
        &self,
        session_id: &str,
        name: &str,
        instructions: Option<&str>,
        model_profile: Option<&str>,
    ) -> StoreResult<Queue> {
        if name.trim().is_empty() {
            return Err(StoreError::Invalid("queue name must not be empty".into()));
        }
        // Existence check; a FK violation would otherwise surface as an
        // opaque database error rather than a clean NotFound.
        self.get_session(session_id).await?;

        let queue = Queue {
            id: ids::generate(ids::prefix::QUEUE),
            session_id: session_id.to_string(),
            name: name.to_string(),
            instructions: instructions.map(str::to_string),
            model_profile: model_profile.map(str::to_string),
            created_at: Utc::now(),
            ended_at: None,
            archived_at: None,
        };

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query(
            "INSERT INTO queues (id, session_id, name, instructions, model_profile, created_at, ended_at, archived_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&queue.id)
        .bind(&queue.session_id)
        .bind(&queue.name)
        .bind(&queue.instructions)
        .bind(&queue.model_profile)
        .bind(queue.created_at)
        .bind(queue.ended_at)
        .bind(queue.archived_at)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        audit::record(&mut *tx, "queue", &queue.id, "create", None, None).await?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(queue)
    }

    pub async fn get_queue(&self, id: &str) -> StoreResult<Queue> {
        sqlx::query_as::<_, Queue>("SELECT * FROM queues WHERE id = ?")
            .bind(id)
            .fetch_optional(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("queue {id} not found")))
    }

    /// Resolves a queue's derived status from its current task
    /// distribution. Explicit `ended`/`archived` overrides are checked
    /// first and short-circuit the task query entirely.
    pub async fn queue_status(&self, queue: &Queue) -> StoreResult<QueueStatus> {
        if queue.is_archived() {
            return Ok(QueueStatus::Archived);
        }
        if queue.is_ended() {
            return Ok(QueueStatus::Ended);
        }

        let has_running: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE queue_id = ? AND status = 'running')",
        )
        .bind(&queue.id)
        .fetch_one(self.read_pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        let has_queued: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE queue_id = ? AND status = 'queued')",
        )
        .bind(&queue.id)
        .fetch_one(self.read_pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(queue.derive_status(has_running, has_queued))
    }

    /// Lists queues, optionally filtered by session and/or derived status.
    /// The status filter is applied after resolution since it isn't a
    /// stored column.
    pub async fn list_queues(
        &self,
        session_id: Option<&str>,
        status: Option<QueueStatus>,
    ) -> StoreResult<Vec<(Queue, QueueStatus)>> {
        let queues = if let Some(session_id) = session_id {
            sqlx::query_as::<_, Queue>(
                "SELECT * FROM queues WHERE session_id = ? ORDER BY created_at ASC",
            )
            .bind(session_id)
            .fetch_all(self.read_pool())
            .await
        } else {
            sqlx::query_as::<_, Queue>("SELECT * FROM queues ORDER BY created_at ASC")
                .fetch_all(self.read_pool())
                .await
        }
        .map_err(StoreError::from_sqlx)?;

        let mut resolved = Vec::with_capacity(queues.len());
        for queue in queues {
            let derived = self.queue_status(&queue).await?;
            if status.map_or(true, |s| s == derived) {
                resolved.push((queue, derived));
            }
        }
        Ok(resolved)
    }

    pub async fn update_queue(
        &self,
        id: &str,
        instructions: Option<Option<String>>,
        model_profile: Option<Option<String>>,
    ) -> StoreResult<Queue> {
        let mut queue = self.get_queue(id).await?;

        if let Some(instructions) = instructions {
            queue.instructions = instructions;
        }
        if let Some(model_profile) = model_profile {
            queue.model_profile = model_profile;
        }

        sqlx::query("UPDATE queues SET instructions = ?, model_profile = ? WHERE id = ?")
            .bind(&queue.instructions)
            .bind(&queue.model_profile)
            .bind(&queue.id)
            .execute(self.write_pool())
            .await
            .map_err(StoreError::from_sqlx)?;

        Ok(queue)
    }

    pub async fn end_queue(&self, id: &str) -> StoreResult<Queue> {
        let mut queue = self.get_queue(id).await?;
        if queue.is_ended() {
            return Err(StoreError::Conflict(format!("queue {id} already ended")));
        }

        let ended_at = Utc::now();
        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query("UPDATE queues SET ended_at = ? WHERE id = ?")
            .bind(ended_at)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        audit::record(&mut *tx, "queue", id, "end", None, None).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;

        queue.ended_at = Some(ended_at);
        Ok(queue)
    }

    pub async fn archive_queue(&self, id: &str) -> StoreResult<Queue> {
        let mut queue = self.get_queue(id).await?;
        if queue.is_archived() {
            return Err(StoreError::Conflict(format!("queue {id} already archived")));
        }

        let archived_at = Utc::now();
        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query("UPDATE queues SET archived_at = ? WHERE id = ?")
            .bind(archived_at)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        audit::record(&mut *tx, "queue", id, "archive", None, None).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;

        queue.archived_at = Some(archived_at);
        Ok(queue)
    }

    pub async fn unarchive_queue(&self, id: &str) -> StoreResult<Queue> {
        let mut queue = self.get_queue(id).await?;
        if !queue.is_archived() {
            return Err(StoreError::Conflict(format!("queue {id} is not archived")));
        }

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query("UPDATE queues SET archived_at = NULL WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        audit::record(&mut *tx, "queue", id, "unarchive", None, None).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;

        queue.archived_at = None;
        Ok(queue)
    }

    /// Deletes a queue, cascading through its tasks.
    pub async fn delete_queue(&self, id: &str) -> StoreResult<()> {
        self.get_queue(id).await?;

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query("DELETE FROM tasks WHERE queue_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query("DELETE FROM queues WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        audit::record(&mut *tx, "queue", id, "delete", None, None).await?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(())
    }
}
