use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::ids;
use crate::models::project::{Project, DEFAULT_PROJECT_ID};
use chrono::Utc;

impl Store {
    /// Idempotently ensures the singleton default project exists, creating
    /// it on first run. The core never deletes a project.
    pub async fn ensure_default_project(&self) -> StoreResult<Project> {
        if let Some(project) = self.get_project(DEFAULT_PROJECT_ID).await? {
            return Ok(project);
        }

        let project = Project {
            id: DEFAULT_PROJECT_ID.to_string(),
            name: "Default Project".to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO projects (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&project.id)
            .bind(&project.name)
            .bind(project.created_at)
            .execute(self.write_pool())
            .await
            .map_err(StoreError::from_sqlx)?;

        Ok(project)
    }

    pub async fn get_project(&self, id: &str) -> StoreResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(self.read_pool())
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(project)
    }

    /// Convenience for a prefixed project id; unused for anything beyond
    /// the default singleton today. Kept for parity with other entity
    /// constructors.
    #[allow(dead_code)]
    fn next_project_id() -> String {
        ids::generate(ids::prefix::PROJECT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_project_id_has_prefix() {
        assert!(Store::next_project_id().starts_with("prj_"));
    }
}
