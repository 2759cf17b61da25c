//! Sales-side restore of board and pipeline templates.
//!
//! Restored records always get fresh ids. Everything a restore creates is
//! written in one transaction.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde_json::{json, Value};
use crate::context::ServiceContext;
use crate::error::SalesError;
use crate::models::{Board, PipelineDoc, Stage, Template};
use crate::repo::{BoardRepo, PipelineRepo, StageRepo};
use super::content::{BoardContent, PipelineContent, PipelineTemplateContent};
use super::pipelines::validate_doc;
use super::require_non_empty;

/// Materialize `template` as a new `resource` (`board` or `pipeline`)
pub fn restore(ctx: &ServiceContext, template: &Template, resource: &str, board_id: Option<&str>) -> Result<Value> {
    match resource {
        "board" => restore_board(ctx, template),
        "pipeline" => {
            let board_id = board_id.ok_or_else(|| {
                SalesError::validation("A target board id is required to restore a pipeline template")
            })?;
            restore_pipeline(ctx, template, board_id)
        }
        other => Err(SalesError::validation(format!("Unsupported sales resource '{}'", other)).into()),
    }
}

/// Apply the checks pipeline creation runs, before anything is written
fn validate_pipeline(content: &PipelineContent) -> Result<()> {
    require_non_empty(&content.name, "Pipeline name")?;
    validate_doc(&PipelineDoc {
        name: Some(content.name.clone()),
        start_date: content.start_date,
        end_date: content.end_date,
        number_config: content.number_config.clone(),
        number_size: content.number_size.clone(),
        ..Default::default()
    })?;
    for stage in &content.stages {
        require_non_empty(&stage.name, "Stage name")?;
    }
    Ok(())
}

fn write_pipeline(
    conn: &Connection,
    content: &PipelineContent,
    board_id: &str,
    user_id: Option<String>,
) -> Result<String> {
    let mut pipeline = content.to_pipeline(board_id, user_id);
    pipeline.name = content.name.trim().to_string();
    PipelineRepo::create(conn, &pipeline)?;
    for stage_content in &content.stages {
        let mut stage = Stage::new(pipeline.id.clone(), stage_content.name.trim().to_string());
        stage.probability = stage_content.probability.clone();
        stage.status = stage_content.status;
        stage.order = stage_content.order;
        StageRepo::create(conn, &stage)?;
    }
    Ok(pipeline.id)
}

fn restore_board(ctx: &ServiceContext, template: &Template) -> Result<Value> {
    let content: BoardContent = serde_json::from_str(&template.content)
        .with_context(|| format!("Template {} does not hold board content", template.id))?;

    require_non_empty(&content.board.name, "Board name")?;
    for pipeline in &content.pipelines {
        validate_pipeline(pipeline)?;
    }

    let board = Board::new(content.board.name.trim().to_string(), ctx.user_owned());

    let tx = ctx.conn.unchecked_transaction()?;
    BoardRepo::create(&tx, &board)?;
    let mut pipeline_ids = Vec::new();
    for pipeline in &content.pipelines {
        pipeline_ids.push(write_pipeline(&tx, pipeline, &board.id, ctx.user_owned())?);
    }
    tx.commit()?;

    log::info!("Restored board {} from template {}", board.id, template.id);
    Ok(json!({
        "resourceType": "board",
        "boardId": board.id,
        "name": board.name,
        "pipelineIds": pipeline_ids,
    }))
}

fn restore_pipeline(ctx: &ServiceContext, template: &Template, board_id: &str) -> Result<Value> {
    if BoardRepo::get_by_id(ctx.conn, board_id)?.is_none() {
        return Err(SalesError::not_found("Board", board_id).into());
    }
    let content: PipelineTemplateContent = serde_json::from_str(&template.content)
        .with_context(|| format!("Template {} does not hold pipeline content", template.id))?;
    validate_pipeline(&content.pipeline)?;

    let tx = ctx.conn.unchecked_transaction()?;
    let pipeline_id = write_pipeline(&tx, &content.pipeline, board_id, ctx.user_owned())?;
    tx.commit()?;

    log::info!("Restored pipeline {} from template {}", pipeline_id, template.id);
    Ok(json!({
        "resourceType": "pipeline",
        "boardId": board_id,
        "pipelineId": pipeline_id,
        "name": content.pipeline.name.trim(),
        "stageCount": content.pipeline.stages.len(),
    }))
}
