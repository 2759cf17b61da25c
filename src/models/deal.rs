use serde::{Deserialize, Serialize};

/// Time tracking state of a board item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeTrackStatus {
    Started,
    Stopped,
    Paused,
    Completed,
}

impl TimeTrackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeTrackStatus::Started => "started",
            TimeTrackStatus::Stopped => "stopped",
            TimeTrackStatus::Paused => "paused",
            TimeTrackStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "started" => Some(TimeTrackStatus::Started),
            "stopped" => Some(TimeTrackStatus::Stopped),
            "paused" => Some(TimeTrackStatus::Paused),
            "completed" => Some(TimeTrackStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTrack {
    pub status: TimeTrackStatus,
    pub time_spent: i64, // seconds
    pub start_date: Option<i64>,
}

/// An item placed on a board stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub stage_id: String,
    pub name: String,
    pub time_track: Option<TimeTrack>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Deal {
    pub fn new(stage_id: String, name: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            stage_id,
            name,
            time_track: None,
            created_ts: now,
            modified_ts: now,
        }
    }
}
