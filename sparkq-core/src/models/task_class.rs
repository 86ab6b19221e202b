/// Task-class model
///
/// A named timeout profile (e.g. `FAST_SCRIPT`, `LLM_HEAVY`) referenced by
/// `Task.task_class`. Deletion is refused while any task still references
/// it.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskClass {
    pub name: String,
    pub default_timeout_seconds: i64,
    pub description: Option<String>,
}
