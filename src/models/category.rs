use serde::{Deserialize, Serialize};
use super::TemplateStatus;

/// Node in the template category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCategory {
    pub id: String,
    pub name: String,
    pub code: String,
    pub parent_id: Option<String>,
    pub content_type: String,
    pub order: Option<String>,
    pub status: TemplateStatus,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl TemplateCategory {
    pub fn new(name: String, code: String, content_type: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            code,
            parent_id: None,
            content_type,
            order: None,
            status: TemplateStatus::Active,
            created_by: None,
            updated_by: None,
            created_ts: now,
            modified_ts: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDoc {
    pub name: Option<String>,
    pub code: Option<String>,
    pub parent_id: Option<String>,
    pub content_type: Option<String>,
    pub order: Option<String>,
    pub status: Option<TemplateStatus>,
}
