use serde::{Deserialize, Serialize};
use super::RecordStatus;

/// A step within a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub pipeline_id: String,
    pub name: String,
    pub probability: Option<String>, // label such as "10%" or "Won"
    pub status: RecordStatus,
    pub order: i64,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Stage {
    pub fn new(pipeline_id: String, name: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pipeline_id,
            name,
            probability: None,
            status: RecordStatus::Active,
            order: 0,
            created_ts: now,
            modified_ts: now,
        }
    }
}

/// Stage entry passed along with pipeline add/edit.
/// An entry carrying `id` updates that stage; one without creates a new stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDoc {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub probability: Option<String>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub order: Option<i64>,
}

impl StageDoc {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}
