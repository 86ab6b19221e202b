use super::Store;
use crate::error::{StoreError, StoreResult};
use serde::Serialize;
use std::collections::HashMap;

/// Summary counts for `GET /api/stats`: tasks broken down by status, by
/// queue, and by session, plus overall totals.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Stats {
    pub total_tasks: i64,
    pub by_status: HashMap<String, i64>,
    pub by_queue: HashMap<String, i64>,
    pub by_session: HashMap<String, i64>,
}

impl Store {
    pub async fn stats(&self) -> StoreResult<Stats> {
        let total_tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)?;

        let status_rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM tasks GROUP BY status")
                .fetch_all(self.read_pool())
                .await
                .map_err(StoreError::from_sqlx)?;

        let queue_rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT queue_id, COUNT(*) FROM tasks GROUP BY queue_id")
                .fetch_all(self.read_pool())
                .await
                .map_err(StoreError::from_sqlx)?;

        let session_rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT q.session_id, COUNT(*)
             FROM tasks t JOIN queues q ON q.id = t.queue_id
             GROUP BY q.session_id",
        )
        .fetch_all(self.read_pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(Stats {
            total_tasks,
            by_status: status_rows.into_iter().collect(),
            by_queue: queue_rows.into_iter().collect(),
            by_session: session_rows.into_iter().collect(),
        })
    }
}
