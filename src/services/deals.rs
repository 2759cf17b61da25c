use anyhow::Result;
use crate::context::ServiceContext;
use crate::error::SalesError;
use crate::models::Deal;
use crate::repo::{DealRepo, StageRepo};
use super::require_non_empty;

/// Place a new deal on a stage
pub fn add(ctx: &ServiceContext, stage_id: &str, name: &str) -> Result<Deal> {
    require_non_empty(name, "Deal name")?;
    if StageRepo::get_by_id(ctx.conn, stage_id)?.is_none() {
        return Err(SalesError::not_found("Stage", stage_id).into());
    }

    let deal = Deal::new(stage_id.to_string(), name.trim().to_string());
    DealRepo::create(ctx.conn, &deal)?;
    log::info!("Created deal {} on stage {}", deal.id, stage_id);
    Ok(deal)
}

pub fn get(ctx: &ServiceContext, id: &str) -> Result<Deal> {
    DealRepo::get_by_id(ctx.conn, id)?
        .ok_or_else(|| SalesError::not_found("Deal", id).into())
}
