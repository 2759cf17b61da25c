use serde::{Deserialize, Serialize};

/// Top-level grouping of sales pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    pub user_id: Option<String>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Board {
    pub fn new(name: String, user_id: Option<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            user_id,
            created_ts: now,
            modified_ts: now,
        }
    }
}

/// Partial board update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDoc {
    pub name: Option<String>,
}
