use anyhow::Result;
use crate::context::ServiceContext;
use crate::error::SalesError;
use crate::models::FieldGroup;
use crate::repo::{BoardRepo, FieldGroupRepo, PipelineRepo};
use super::require_non_empty;

/// Register a field group scoped to existing boards and pipelines
pub fn add(
    ctx: &ServiceContext,
    name: &str,
    board_ids: &[String],
    pipeline_ids: &[String],
) -> Result<FieldGroup> {
    require_non_empty(name, "Field group name")?;
    for id in board_ids {
        if BoardRepo::get_by_id(ctx.conn, id)?.is_none() {
            return Err(SalesError::not_found("Board", id.as_str()).into());
        }
    }
    for id in pipeline_ids {
        if PipelineRepo::get_by_id(ctx.conn, id)?.is_none() {
            return Err(SalesError::not_found("Pipeline", id.as_str()).into());
        }
    }

    let mut group = FieldGroup::new(name.trim().to_string());
    group.board_ids = board_ids.to_vec();
    group.pipeline_ids = pipeline_ids.to_vec();
    FieldGroupRepo::create(ctx.conn, &group)?;

    log::info!("Created field group {} ({})", group.id, group.name);
    Ok(group)
}

pub fn list(ctx: &ServiceContext) -> Result<Vec<FieldGroup>> {
    FieldGroupRepo::list(ctx.conn)
}
