/// Session model
///
/// A Session is a named container of queues representing one unit of
/// work. `ended` is terminal for creating new queues within the session
/// but does not affect queues that already exist.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Status is derived from `ended_at` rather than stored redundantly.
    pub fn status(&self) -> SessionStatus {
        if self.ended_at.is_some() {
            SessionStatus::Ended
        } else {
            SessionStatus::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_active_when_not_ended() {
        let session = Session {
            id: "ses_1".into(),
            project_id: "prj_default".into(),
            name: "dev".into(),
            started_at: Utc::now(),
            ended_at: None,
        };
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn test_status_ended() {
        let session = Session {
            id: "ses_1".into(),
            project_id: "prj_default".into(),
            name: "dev".into(),
            started_at: Utc::now(),
            ended_at: Some(Utc::now()),
        };
        assert_eq!(session.status(), SessionStatus::Ended);
    }
}
