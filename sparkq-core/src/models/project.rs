/// Project model
///
/// A Project is a singleton in practice: `prj_default` is created on first
/// run and never deleted by the core. It exists so the rest of the
/// hierarchy (Session → Queue → Task) has a stable root, should a future
/// deployment ever need more than one.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The canonical id of the default, auto-created project.
pub const DEFAULT_PROJECT_ID: &str = "prj_default";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_project_id() {
        assert_eq!(DEFAULT_PROJECT_ID, "prj_default");
    }
}
