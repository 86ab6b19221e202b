use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::models::tool::Tool;

impl Store {
    pub async fn create_tool(
        &self,
        name: &str,
        task_class: &str,
        description: Option<&str>,
    ) -> StoreResult<Tool> {
        if name.trim().is_empty() {
            return Err(StoreError::Invalid("tool name must not be empty".into()));
        }
        // Existence check for a clean NotFound instead of an FK violation.
        self.get_task_class(task_class).await?;

        let tool = Tool {
            name: name.to_string(),
            task_class: task_class.to_string(),
            description: description.map(str::to_string),
        };

        sqlx::query("INSERT INTO tools (name, task_class, description) VALUES (?, ?, ?)")
            .bind(&tool.name)
            .bind(&tool.task_class)
            .bind(&tool.description)
            .execute(self.write_pool())
            .await
            .map_err(StoreError::from_sqlx)?;

        Ok(tool)
    }

    pub async fn get_tool(&self, name: &str) -> StoreResult<Tool> {
        sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE name = ?")
            .bind(name)
            .fetch_optional(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("tool {name} not found")))
    }

    pub async fn list_tools(&self) -> StoreResult<Vec<Tool>> {
        sqlx::query_as::<_, Tool>("SELECT * FROM tools ORDER BY name ASC")
            .fetch_all(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)
    }

    /// Refuses deletion while any task still references this tool. The
    /// check and the delete run inside one transaction so a task enqueued
    /// against this tool between the two can't slip through: it either
    /// loses the race and the delete is refused, or the delete commits
    /// first and the enqueue's own transaction sees the tool gone.
    pub async fn delete_tool(&self, name: &str) -> StoreResult<()> {
        self.get_tool(name).await?;

        let mut tx = self
            .write_pool()
            .begin()
            .await
            .map_err(StoreError::from_sqlx)?;

        let in_use: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE tool_name = ?)")
            .bind(name)
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        if in_use {
            return Err(StoreError::Conflict(format!(
                "tool {name} is still referenced by tasks"
            )));
        }

        sqlx::query("DELETE FROM tools WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(())
    }
}
