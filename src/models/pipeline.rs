use serde::{Deserialize, Serialize};

/// Lifecycle of pipelines and stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Archived,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(RecordStatus::Active),
            "archived" => Some(RecordStatus::Archived),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            RecordStatus::Active => RecordStatus::Archived,
            RecordStatus::Archived => RecordStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

/// An ordered set of stages representing a sales process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub board_id: String,
    pub name: String,
    pub status: RecordStatus,
    pub visibility: Visibility,
    pub bg_color: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub metric: Option<String>,
    pub hack_scoring_type: Option<String>,
    pub is_check_date: bool,
    pub is_check_user: bool,
    pub is_check_department: bool,
    pub number_config: Option<String>,
    pub number_size: Option<String>,
    pub name_config: Option<String>,
    pub order: i64,
    pub user_id: Option<String>,
    /// Users notified about changes to this pipeline
    #[serde(default)]
    pub watched_user_ids: Vec<String>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Pipeline {
    pub fn new(board_id: String, name: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            board_id,
            name,
            status: RecordStatus::Active,
            visibility: Visibility::Public,
            bg_color: None,
            start_date: None,
            end_date: None,
            metric: None,
            hack_scoring_type: None,
            is_check_date: false,
            is_check_user: false,
            is_check_department: false,
            number_config: None,
            number_size: None,
            name_config: None,
            order: 0,
            user_id: None,
            watched_user_ids: Vec::new(),
            created_ts: now,
            modified_ts: now,
        }
    }

    /// Add or drop `user_id` from the watchers; returns whether the list changed
    pub fn set_watch(&mut self, user_id: &str, watch: bool) -> bool {
        let present = self.watched_user_ids.iter().any(|u| u == user_id);
        match (watch, present) {
            (true, false) => {
                self.watched_user_ids.push(user_id.to_string());
                true
            }
            (false, true) => {
                self.watched_user_ids.retain(|u| u != user_id);
                true
            }
            _ => false,
        }
    }

    /// Overwrite every field the doc carries
    pub fn apply(&mut self, doc: &PipelineDoc) {
        if let Some(ref board_id) = doc.board_id {
            self.board_id = board_id.clone();
        }
        if let Some(ref name) = doc.name {
            self.name = name.clone();
        }
        if let Some(status) = doc.status {
            self.status = status;
        }
        if let Some(visibility) = doc.visibility {
            self.visibility = visibility;
        }
        if doc.bg_color.is_some() {
            self.bg_color = doc.bg_color.clone();
        }
        if doc.start_date.is_some() {
            self.start_date = doc.start_date;
        }
        if doc.end_date.is_some() {
            self.end_date = doc.end_date;
        }
        if doc.metric.is_some() {
            self.metric = doc.metric.clone();
        }
        if doc.hack_scoring_type.is_some() {
            self.hack_scoring_type = doc.hack_scoring_type.clone();
        }
        if let Some(v) = doc.is_check_date {
            self.is_check_date = v;
        }
        if let Some(v) = doc.is_check_user {
            self.is_check_user = v;
        }
        if let Some(v) = doc.is_check_department {
            self.is_check_department = v;
        }
        if doc.number_config.is_some() {
            self.number_config = doc.number_config.clone();
        }
        if doc.number_size.is_some() {
            self.number_size = doc.number_size.clone();
        }
        if doc.name_config.is_some() {
            self.name_config = doc.name_config.clone();
        }
        if let Some(order) = doc.order {
            self.order = order;
        }
    }
}

/// Pipeline fields supplied by add/edit; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDoc {
    pub board_id: Option<String>,
    pub name: Option<String>,
    pub status: Option<RecordStatus>,
    pub visibility: Option<Visibility>,
    pub bg_color: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub metric: Option<String>,
    pub hack_scoring_type: Option<String>,
    pub is_check_date: Option<bool>,
    pub is_check_user: Option<bool>,
    pub is_check_department: Option<bool>,
    pub number_config: Option<String>,
    pub number_size: Option<String>,
    pub name_config: Option<String>,
    pub order: Option<i64>,
}
