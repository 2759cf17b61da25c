// Argument validators used by the clap parsers

use crate::models::{RecordStatus, StageDoc, TemplateStatus, TimeTrackStatus, Visibility};
use crate::services::pipelines::PipelineOrder;
use crate::utils::{parse_date_expr, parse_time_spent};

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("value cannot be empty".to_string())
    } else {
        Ok(value.trim().to_string())
    }
}

/// Validate a `#rgb` or `#rrggbb` color
pub fn validate_hex_color(value: &str) -> Result<String, String> {
    let hex = value.strip_prefix('#')
        .ok_or_else(|| format!("Invalid color '{}'. Colors start with '#'", value))?;
    if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Invalid color '{}'. Use #rgb or #rrggbb", value));
    }
    Ok(value.to_string())
}

/// Parse `NAME` or `NAME=PROBABILITY` into a new stage entry
pub fn parse_stage_spec(value: &str) -> Result<StageDoc, String> {
    let (name, probability) = match value.split_once('=') {
        Some((name, probability)) => (name.trim(), Some(probability.trim())),
        None => (value.trim(), None),
    };
    if name.is_empty() {
        return Err(format!("Invalid stage '{}'. Expected NAME or NAME=PROBABILITY", value));
    }
    let mut stage = StageDoc::named(name);
    stage.probability = probability.filter(|p| !p.is_empty()).map(str::to_string);
    Ok(stage)
}

/// Complete stage list given as one JSON argument
#[derive(Debug, Clone)]
pub struct StageList(pub Vec<StageDoc>);

/// Parse a JSON array of stage entries (`[{"id"?, "name", "probability"?, ...}]`)
pub fn parse_stage_list(value: &str) -> Result<StageList, String> {
    serde_json::from_str(value)
        .map(StageList)
        .map_err(|e| format!("Invalid stage list: {}", e))
}

/// Parse `ID=ORDER` for a pipeline reorder
pub fn parse_pipeline_order(value: &str) -> Result<PipelineOrder, String> {
    let invalid = || format!("Invalid position '{}'. Expected ID=ORDER", value);
    let (id, order) = value.split_once('=').ok_or_else(invalid)?;
    let id = id.trim();
    if id.is_empty() {
        return Err(invalid());
    }
    let order = order.trim().parse::<i64>().map_err(|_| invalid())?;
    Ok(PipelineOrder { id: id.to_string(), order })
}

pub fn parse_record_status(value: &str) -> Result<RecordStatus, String> {
    RecordStatus::from_str(value)
        .ok_or_else(|| format!("Invalid status '{}'. Valid values: active, archived", value))
}

pub fn parse_template_status(value: &str) -> Result<TemplateStatus, String> {
    TemplateStatus::from_str(value)
        .ok_or_else(|| format!("Invalid status '{}'. Valid values: active, inactive", value))
}

pub fn parse_visibility(value: &str) -> Result<Visibility, String> {
    Visibility::from_str(value)
        .ok_or_else(|| format!("Invalid visibility '{}'. Valid values: public, private", value))
}

pub fn parse_time_track_status(value: &str) -> Result<TimeTrackStatus, String> {
    TimeTrackStatus::from_str(value).ok_or_else(|| {
        format!(
            "Invalid time tracking status '{}'. Valid values: started, stopped, paused, completed",
            value
        )
    })
}

pub fn parse_seconds(value: &str) -> Result<i64, String> {
    parse_time_spent(value).map_err(|e| e.to_string())
}

pub fn parse_timestamp(value: &str) -> Result<i64, String> {
    parse_date_expr(value).map_err(|e| e.to_string())
}
