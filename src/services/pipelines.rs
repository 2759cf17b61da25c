use anyhow::Result;
use chrono::Datelike;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::context::ServiceContext;
use crate::error::SalesError;
use crate::models::{GroupRef, Pipeline, PipelineDoc, RecordStatus, Stage, StageDoc};
use crate::repo::{BoardRepo, PipelineRepo, StageRepo};
use super::content::{
    submit_template, PipelineContent, PipelineTemplateContent, SaveAsTemplate, SavedTemplate,
    PIPELINE_CONTENT_TYPE,
};
use super::references::detach_references;
use super::{require, require_non_empty};

/// Probability given to copied stages that carry none
pub const DEFAULT_PROBABILITY: &str = "10%";

/// A pipeline with its stages in order
#[derive(Debug, Clone, Serialize)]
pub struct PipelineDetail {
    pub pipeline: Pipeline,
    pub stages: Vec<Stage>,
}

/// New position of one pipeline in a bulk reorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOrder {
    pub id: String,
    pub order: i64,
}

pub fn get(ctx: &ServiceContext, id: &str) -> Result<Pipeline> {
    PipelineRepo::get_by_id(ctx.conn, id)?
        .ok_or_else(|| SalesError::not_found("Pipeline", id).into())
}

fn ensure_board(conn: &Connection, board_id: &str) -> Result<()> {
    if BoardRepo::get_by_id(conn, board_id)?.is_none() {
        return Err(SalesError::not_found("Board", board_id).into());
    }
    Ok(())
}

/// Check a document numbering configuration.
///
/// Both parts are required, the size must be a positive integer and the
/// expanded pattern must not end in a digit (the sequence number goes there).
pub fn check_number_config(number_config: Option<&str>, number_size: Option<&str>) -> Result<()> {
    let config = require(number_config, "Number configuration")?;
    let size = require(number_size, "Number size")?;

    match size.trim().parse::<u32>() {
        Ok(n) if n > 0 => {}
        _ => {
            return Err(SalesError::validation(format!(
                "Number size must be a positive integer, got '{}'",
                size
            ))
            .into())
        }
    }

    let today = chrono::Local::now().date_naive();
    let expanded = config
        .replace("{year}", &today.year().to_string())
        .replace("{month}", &format!("{:02}", today.month()))
        .replace("{day}", &format!("{:02}", today.day()));

    if expanded.chars().last().map_or(false, |c| c.is_ascii_digit()) {
        return Err(SalesError::validation(format!(
            "Number configuration '{}' must not end with a number",
            config
        ))
        .into());
    }
    Ok(())
}

pub(crate) fn validate_doc(doc: &PipelineDoc) -> Result<()> {
    if let Some(ref name) = doc.name {
        require_non_empty(name, "Pipeline name")?;
    }
    if doc.number_config.is_some() || doc.number_size.is_some() {
        check_number_config(doc.number_config.as_deref(), doc.number_size.as_deref())?;
    }
    if let (Some(start), Some(end)) = (doc.start_date, doc.end_date) {
        if start > end {
            return Err(SalesError::validation("Start date must not be after end date").into());
        }
    }
    Ok(())
}

/// Bring the pipeline's stages in line with `docs`: entries with an id are
/// updated, entries without one are created and stages not mentioned are
/// removed.
fn sync_stages(conn: &Connection, pipeline_id: &str, docs: &[StageDoc]) -> Result<Vec<Stage>> {
    let existing = StageRepo::list_for_pipeline(conn, pipeline_id)?;
    let now = chrono::Utc::now().timestamp();

    let kept: HashSet<&str> = docs.iter().filter_map(|d| d.id.as_deref()).collect();
    for stage in &existing {
        if !kept.contains(stage.id.as_str()) {
            StageRepo::delete(conn, &stage.id)?;
        }
    }

    let mut stages = Vec::new();
    for (index, doc) in docs.iter().enumerate() {
        require_non_empty(&doc.name, "Stage name")?;
        let order = doc.order.unwrap_or(index as i64);

        let stage = match doc.id {
            Some(ref id) => {
                let mut stage = existing
                    .iter()
                    .find(|s| &s.id == id)
                    .cloned()
                    .ok_or_else(|| SalesError::not_found("Stage", id.as_str()))?;
                stage.name = doc.name.clone();
                if doc.probability.is_some() {
                    stage.probability = doc.probability.clone();
                }
                if let Some(status) = doc.status {
                    stage.status = status;
                }
                stage.order = order;
                stage.modified_ts = now;
                StageRepo::update(conn, &stage)?;
                stage
            }
            None => {
                let mut stage = Stage::new(pipeline_id.to_string(), doc.name.clone());
                stage.probability = doc.probability.clone();
                stage.status = doc.status.unwrap_or(RecordStatus::Active);
                stage.order = order;
                StageRepo::create(conn, &stage)?;
                stage
            }
        };
        stages.push(stage);
    }
    Ok(stages)
}

/// Create a pipeline and its stages
pub fn add(ctx: &ServiceContext, doc: &PipelineDoc, stages: &[StageDoc]) -> Result<PipelineDetail> {
    let name = require(doc.name.as_deref(), "Pipeline name")?;
    let board_id = require(doc.board_id.as_deref(), "Board id")?;
    validate_doc(doc)?;
    ensure_board(ctx.conn, board_id)?;
    if stages.iter().any(|s| s.id.is_some()) {
        return Err(SalesError::validation("New pipelines cannot reference existing stages").into());
    }

    let mut pipeline = Pipeline::new(board_id.to_string(), name.trim().to_string());
    pipeline.apply(doc);
    pipeline.name = name.trim().to_string();
    pipeline.user_id = ctx.user_owned();

    let tx = ctx.conn.unchecked_transaction()?;
    PipelineRepo::create(&tx, &pipeline)?;
    let stages = sync_stages(&tx, &pipeline.id, stages)?;
    tx.commit()?;

    log::info!("Created pipeline {} ({}) with {} stage(s)", pipeline.id, pipeline.name, stages.len());
    Ok(PipelineDetail { pipeline, stages })
}

/// Partial update; when `stages` is given the stage list is synced as well
pub fn edit(
    ctx: &ServiceContext,
    id: &str,
    doc: &PipelineDoc,
    stages: Option<&[StageDoc]>,
) -> Result<PipelineDetail> {
    let mut pipeline = get(ctx, id)?;
    validate_doc(doc)?;
    if let Some(ref board_id) = doc.board_id {
        ensure_board(ctx.conn, board_id)?;
    }

    pipeline.apply(doc);
    if let Some(ref name) = doc.name {
        pipeline.name = name.trim().to_string();
    }
    if let (Some(start), Some(end)) = (pipeline.start_date, pipeline.end_date) {
        if start > end {
            return Err(SalesError::validation("Start date must not be after end date").into());
        }
    }
    pipeline.modified_ts = chrono::Utc::now().timestamp();

    let tx = ctx.conn.unchecked_transaction()?;
    PipelineRepo::update(&tx, &pipeline)?;
    let stages = match stages {
        Some(docs) => sync_stages(&tx, id, docs)?,
        None => StageRepo::list_for_pipeline(&tx, id)?,
    };
    tx.commit()?;

    log::info!("Updated pipeline {} ({})", pipeline.id, pipeline.name);
    Ok(PipelineDetail { pipeline, stages })
}

/// Remove a pipeline after detaching it from field groups.
/// Stages and their deals are removed with it.
pub fn remove(ctx: &ServiceContext, id: &str) -> Result<Pipeline> {
    let pipeline = get(ctx, id)?;

    detach_references(ctx, GroupRef::Pipeline, id)?;
    PipelineRepo::delete(ctx.conn, id)?;
    log::info!("Removed pipeline {} ({})", pipeline.id, pipeline.name);
    Ok(pipeline)
}

/// Set `status` if given, otherwise toggle between active and archived
pub fn archive(ctx: &ServiceContext, id: &str, status: Option<RecordStatus>) -> Result<Pipeline> {
    let mut pipeline = get(ctx, id)?;
    let status = status.unwrap_or_else(|| pipeline.status.toggled());

    PipelineRepo::set_status(ctx.conn, id, status)?;
    pipeline.status = status;
    log::info!("Pipeline {} is now {}", id, status.as_str());
    Ok(pipeline)
}

/// Set the position of several pipelines at once. Nothing changes when any
/// of them is unknown.
pub fn update_order(ctx: &ServiceContext, orders: &[PipelineOrder]) -> Result<Vec<Pipeline>> {
    let tx = ctx.conn.unchecked_transaction()?;
    for entry in orders {
        if !PipelineRepo::set_order(&tx, &entry.id, entry.order)? {
            return Err(SalesError::not_found("Pipeline", entry.id.as_str()).into());
        }
    }
    tx.commit()?;

    log::info!("Reordered {} pipeline(s)", orders.len());
    orders.iter().map(|entry| get(ctx, &entry.id)).collect()
}

/// Add the acting user to the pipeline's watchers, or drop them
pub fn watch(ctx: &ServiceContext, id: &str, is_add: bool) -> Result<Pipeline> {
    let user = ctx
        .user
        .ok_or_else(|| SalesError::validation("A user is required to watch a pipeline"))?;
    let mut pipeline = get(ctx, id)?;

    if pipeline.set_watch(user, is_add) {
        PipelineRepo::set_watchers(ctx.conn, id, &pipeline.watched_user_ids)?;
        log::info!(
            "User {} {} pipeline {}",
            user,
            if is_add { "now watches" } else { "stopped watching" },
            id
        );
    }
    Ok(pipeline)
}

/// Duplicate a pipeline and its stages under the same board
pub fn copy(ctx: &ServiceContext, id: &str) -> Result<PipelineDetail> {
    let source = get(ctx, id)?;
    let source_stages = StageRepo::list_for_pipeline(ctx.conn, id)?;

    let mut pipeline = source.clone();
    let fresh = Pipeline::new(source.board_id.clone(), format!("{}-copied", source.name));
    pipeline.id = fresh.id;
    pipeline.name = fresh.name;
    pipeline.created_ts = fresh.created_ts;
    pipeline.modified_ts = fresh.modified_ts;
    pipeline.user_id = ctx.user_owned().or(source.user_id);
    pipeline.watched_user_ids.clear();

    let tx = ctx.conn.unchecked_transaction()?;
    PipelineRepo::create(&tx, &pipeline)?;

    let mut stages = Vec::new();
    for source_stage in &source_stages {
        let mut stage = Stage::new(pipeline.id.clone(), source_stage.name.clone());
        stage.status = source_stage.status;
        stage.order = source_stage.order;
        stage.probability = match source_stage.probability.as_deref() {
            Some(p) if !p.is_empty() => Some(p.to_string()),
            _ => Some(DEFAULT_PROBABILITY.to_string()),
        };
        StageRepo::create(&tx, &stage)?;
        stages.push(stage);
    }
    tx.commit()?;

    log::info!("Copied pipeline {} to {} ({} stage(s))", id, pipeline.id, stages.len());
    Ok(PipelineDetail { pipeline, stages })
}

pub fn list(ctx: &ServiceContext, board_id: &str) -> Result<Vec<Pipeline>> {
    ensure_board(ctx.conn, board_id)?;
    PipelineRepo::list_for_board(ctx.conn, board_id)
}

pub fn detail(ctx: &ServiceContext, id: &str) -> Result<PipelineDetail> {
    let pipeline = get(ctx, id)?;
    let stages = StageRepo::list_for_pipeline(ctx.conn, id)?;
    Ok(PipelineDetail { pipeline, stages })
}

/// Export a pipeline and its stages as a `sales:pipeline` template
pub fn save_as_template(ctx: &ServiceContext, id: &str, request: &SaveAsTemplate) -> Result<SavedTemplate> {
    let pipeline = get(ctx, id)?;
    let stages = StageRepo::list_for_pipeline(ctx.conn, id)?;

    let content = PipelineTemplateContent {
        pipeline: PipelineContent::project(&pipeline, &stages, false),
    };

    let template_id = submit_template(
        ctx,
        request,
        serde_json::to_string(&content)?,
        PIPELINE_CONTENT_TYPE,
        format!("Template created from pipeline: {}", pipeline.name),
    )?;
    log::info!("Saved pipeline {} as template {}", pipeline.id, template_id);

    Ok(SavedTemplate {
        success: true,
        template_id,
        message: "Pipeline saved as template successfully".to_string(),
    })
}
