//! Persisted template content for boards and pipelines.
//!
//! Only the fields listed here travel into a template. The JSON keys are
//! camelCase and must stay stable: restoring a template depends on them.

use serde::{Deserialize, Serialize};
use serde_json::json;
use anyhow::{Context, Result};
use crate::context::ServiceContext;
use crate::error::SalesError;
use crate::messenger::MessageRequest;
use crate::models::{Pipeline, RecordStatus, Stage, TemplateDoc, TemplateStatus, Visibility};
use super::handlers::TEMPLATE_SERVICE;

/// Routing tag of board templates
pub const BOARD_CONTENT_TYPE: &str = "sales:board";
/// Routing tag of pipeline templates
pub const PIPELINE_CONTENT_TYPE: &str = "sales:pipeline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageContent {
    pub name: String,
    #[serde(default)]
    pub probability: Option<String>,
    #[serde(default = "active")]
    pub status: RecordStatus,
    #[serde(default)]
    pub order: i64,
}

fn active() -> RecordStatus {
    RecordStatus::Active
}

fn public() -> Visibility {
    Visibility::Public
}

impl From<&Stage> for StageContent {
    fn from(stage: &Stage) -> Self {
        Self {
            name: stage.name.clone(),
            probability: stage.probability.clone(),
            status: stage.status,
            order: stage.order,
        }
    }
}

/// Pipeline fields shared by board and pipeline templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineContent {
    pub name: String,
    #[serde(default = "public")]
    pub visibility: Visibility,
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub start_date: Option<i64>,
    #[serde(default)]
    pub end_date: Option<i64>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub hack_scoring_type: Option<String>,
    #[serde(default)]
    pub is_check_date: bool,
    #[serde(default)]
    pub is_check_user: bool,
    #[serde(default)]
    pub is_check_department: bool,
    #[serde(default)]
    pub number_config: Option<String>,
    #[serde(default)]
    pub number_size: Option<String>,
    #[serde(default)]
    pub name_config: Option<String>,
    /// Only board templates record pipeline ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub stages: Vec<StageContent>,
}

impl PipelineContent {
    pub fn project(pipeline: &Pipeline, stages: &[Stage], with_order: bool) -> Self {
        Self {
            name: pipeline.name.clone(),
            visibility: pipeline.visibility,
            bg_color: pipeline.bg_color.clone(),
            start_date: pipeline.start_date,
            end_date: pipeline.end_date,
            metric: pipeline.metric.clone(),
            hack_scoring_type: pipeline.hack_scoring_type.clone(),
            is_check_date: pipeline.is_check_date,
            is_check_user: pipeline.is_check_user,
            is_check_department: pipeline.is_check_department,
            number_config: pipeline.number_config.clone(),
            number_size: pipeline.number_size.clone(),
            name_config: pipeline.name_config.clone(),
            order: if with_order { Some(pipeline.order) } else { None },
            stages: stages.iter().map(StageContent::from).collect(),
        }
    }

    /// Materialize a new pipeline record under `board_id`
    pub fn to_pipeline(&self, board_id: &str, user_id: Option<String>) -> Pipeline {
        let mut pipeline = Pipeline::new(board_id.to_string(), self.name.clone());
        pipeline.visibility = self.visibility;
        pipeline.bg_color = self.bg_color.clone();
        pipeline.start_date = self.start_date;
        pipeline.end_date = self.end_date;
        pipeline.metric = self.metric.clone();
        pipeline.hack_scoring_type = self.hack_scoring_type.clone();
        pipeline.is_check_date = self.is_check_date;
        pipeline.is_check_user = self.is_check_user;
        pipeline.is_check_department = self.is_check_department;
        pipeline.number_config = self.number_config.clone();
        pipeline.number_size = self.number_size.clone();
        pipeline.name_config = self.name_config.clone();
        pipeline.order = self.order.unwrap_or(0);
        pipeline.user_id = user_id;
        pipeline
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardHeader {
    pub name: String,
}

/// Content of a `sales:board` template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardContent {
    pub board: BoardHeader,
    #[serde(default)]
    pub pipelines: Vec<PipelineContent>,
}

/// Content of a `sales:pipeline` template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineTemplateContent {
    pub pipeline: PipelineContent,
}

/// Arguments of the save-as-template operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveAsTemplate {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<TemplateStatus>,
}

/// Outcome of a save-as-template operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTemplate {
    pub success: bool,
    pub template_id: String,
    pub message: String,
}

/// Hand serialized content to the template service; returns the new template id
pub(crate) fn submit_template(
    ctx: &ServiceContext,
    request: &SaveAsTemplate,
    content: String,
    content_type: &str,
    default_description: String,
) -> Result<String> {
    if request.name.trim().is_empty() {
        return Err(SalesError::validation("Template name cannot be empty").into());
    }

    let doc = TemplateDoc {
        name: Some(request.name.clone()),
        content: Some(content),
        content_type: Some(content_type.to_string()),
        plugin_type: Some("sales".to_string()),
        description: Some(request.description.clone().unwrap_or(default_description)),
        category: None,
        status: Some(request.status.unwrap_or(TemplateStatus::Active)),
    };

    let created = ctx.send(
        MessageRequest::mutation(TEMPLATE_SERVICE, "templates", "add")
            .with_input(json!({ "doc": doc, "currentUser": ctx.user })),
    )?;

    let template_id = created
        .get("id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .context("Template service returned no template id")?;

    Ok(template_id)
}
