/// Queue model
///
/// A Queue is an ordered FIFO of tasks within a session — the unit of
/// concurrency for consumers. `archived` and `ended` are explicit,
/// persisted overrides; `active`/`planned`/`idle` are derived on read from
/// the task distribution and never stored, per the queue status rules.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Archived,
    Ended,
    Active,
    Planned,
    Idle,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Archived => "archived",
            QueueStatus::Ended => "ended",
            QueueStatus::Active => "active",
            QueueStatus::Planned => "planned",
            QueueStatus::Idle => "idle",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Queue {
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub instructions: Option<String>,
    pub model_profile: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Queue {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Resolves the full derived status given whether the queue currently
    /// has any `running` or `queued` tasks. Explicit overrides win over
    /// anything derived from task state.
    pub fn derive_status(&self, has_running: bool, has_queued: bool) -> QueueStatus {
        if self.is_archived() {
            QueueStatus::Archived
        } else if self.is_ended() {
            QueueStatus::Ended
        } else if has_running {
            QueueStatus::Active
        } else if has_queued {
            QueueStatus::Planned
        } else {
            QueueStatus::Idle
        }
    }
}
