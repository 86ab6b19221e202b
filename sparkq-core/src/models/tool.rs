/// Tool model
///
/// A named execution mode (e.g. `llm-haiku`, `run-bash`). Metadata only —
/// the core does not execute tools. `task_class` references an existing
/// `TaskClass`; deletion is refused while any task still references it.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tool {
    pub name: String,
    pub task_class: String,
    pub description: Option<String>,
}
