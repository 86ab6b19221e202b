use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::models::task_class::TaskClass;

impl Store {
    pub async fn create_task_class(
        &self,
        name: &str,
        default_timeout_seconds: i64,
        description: Option<&str>,
    ) -> StoreResult<TaskClass> {
        if name.trim().is_empty() {
            return Err(StoreError::Invalid("task class name must not be empty".into()));
        }
        if default_timeout_seconds <= 0 {
            return Err(StoreError::Invalid("default_timeout_seconds must be positive".into()));
        }

        let task_class = TaskClass {
            name: name.to_string(),
            default_timeout_seconds,
            description: description.map(str::to_string),
        };

        sqlx::query(
            "INSERT INTO task_classes (name, default_timeout_seconds, description) VALUES (?, ?, ?)",
        )
        .bind(&task_class.name)
        .bind(task_class.default_timeout_seconds)
        .bind(&task_class.description)
        .execute(self.write_pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(task_class)
    }

    pub async fn get_task_class(&self, name: &str) -> StoreResult<TaskClass> {
        sqlx::query_as::<_, TaskClass>("SELECT * FROM task_classes WHERE name = ?")
            .bind(name)
            .fetch_optional(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("task class {name} not found")))
    }

    pub async fn list_task_classes(&self) -> StoreResult<Vec<TaskClass>> {
        sqlx::query_as::<_, TaskClass>("SELECT * FROM task_classes ORDER BY name ASC")
            .fetch_all(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)
    }

    /// Refuses deletion while any task or tool still references this
    /// class. Both checks and the delete run inside one transaction so a
    /// concurrent enqueue/tool-create referencing this class can't race
    /// past the checks.
    pub async fn delete_task_class(&self, name: &str) -> StoreResult<()> {
        self.get_task_class(name).await?;

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE task_class = ?)",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        if in_use {
            return Err(StoreError::Conflict(format!(
                "task class {name} is still referenced by tasks"
            )));
        }

        let in_use_by_tool: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tools WHERE task_class = ?)")
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;

        if in_use_by_tool {
            return Err(StoreError::Conflict(format!(
                "task class {name} is still referenced by a tool"
            )));
        }

        sqlx::query("DELETE FROM task_classes WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(())
    }
}
