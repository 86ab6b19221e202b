use super::Store;
use crate::audit;
use crate::error::{StoreError, StoreResult};
use crate::ids;
use crate::models::project::DEFAULT_PROJECT_ID;
use crate::models::session::Session;
use chrono::Utc;

impl Store {
    pub async fn create_session(&self, name: &str) -> StoreResult<Session> {
        if name.trim().is_empty() {
            return Err(StoreError::Invalid("session name must not be empty".into()));
        }

        let session = Session {
            id: ids::generate(ids::prefix::SESSION),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            name: name.to_string(),
            started_at: Utc::now(),
            ended_at: None,
        };

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query(
            "INSERT INTO sessions (id, project_id, name, started_at, ended_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.project_id)
        .bind(&session.name)
        .bind(session.started_at)
        .bind(session.ended_at)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        audit::record(&mut *tx, "session", &session.id, "create", None, None).await?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(session)
    }

    pub async fn get_session(&self, id: &str) -> StoreResult<Session> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("session {id} not found")))
    }

    pub async fn list_sessions(&self) -> StoreResult<Vec<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions ORDER BY started_at ASC")
            .fetch_all(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)
    }

    /// Partial update: `name` is the only mutable field today.
    pub async fn update_session(&self, id: &str, name: Option<&str>) -> StoreResult<Session> {
        let mut session = self.get_session(id).await?;

        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(StoreError::Invalid("session name must not be empty".into()));
            }
            session.name = name.to_string();
        }

        sqlx::query("UPDATE sessions SET name = ? WHERE id = ?")
            .bind(&session.name)
            .bind(&session.id)
            .execute(self.write_pool())
            .await
            .map_err(StoreError::from_sqlx)?;

        Ok(session)
    }

    pub async fn end_session(&self, id: &str) -> StoreResult<Session> {
        let mut session = self.get_session(id).await?;
        if session.ended_at.is_some() {
            return Err(StoreError::Conflict(format!("session {id} already ended")));
        }

        let ended_at = Utc::now();
        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query("UPDATE sessions SET ended_at = ? WHERE id = ?")
            .bind(ended_at)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        audit::record(&mut *tx, "session", id, "end", None, None).await?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;

        session.ended_at = Some(ended_at);
        Ok(session)
    }

    /// Deletes a session, cascading through its queues and tasks.
    pub async fn delete_session(&self, id: &str) -> StoreResult<()> {
        self.get_session(id).await?;

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query(
            "DELETE FROM tasks WHERE queue_id IN (SELECT id FROM queues WHERE session_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        sqlx::query("DELETE FROM queues WHERE session_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        audit::record(&mut *tx, "session", id, "delete", None, None).await?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(())
    }
}
