use anyhow::Result;
use serde::Serialize;
use crate::context::ServiceContext;
use crate::error::SalesError;
use crate::models::{Board, BoardDoc, Deal, GroupRef, TimeTrack, TimeTrackStatus};
use crate::repo::{BoardRepo, DealRepo, PipelineRepo, StageRepo};
use super::content::{
    submit_template, BoardContent, BoardHeader, PipelineContent, SaveAsTemplate, SavedTemplate,
    BOARD_CONTENT_TYPE,
};
use super::pipelines::PipelineDetail;
use super::references::detach_references;
use super::require_non_empty;

/// A board with its pipelines and their stages
#[derive(Debug, Clone, Serialize)]
pub struct BoardDetail {
    pub board: Board,
    pub pipelines: Vec<PipelineDetail>,
}

/// Fetch a board or fail with not-found
pub fn get(ctx: &ServiceContext, id: &str) -> Result<Board> {
    BoardRepo::get_by_id(ctx.conn, id)?
        .ok_or_else(|| SalesError::not_found("Board", id).into())
}

pub fn add(ctx: &ServiceContext, name: &str) -> Result<Board> {
    require_non_empty(name, "Board name")?;

    let board = Board::new(name.trim().to_string(), ctx.user_owned());
    BoardRepo::create(ctx.conn, &board)?;
    log::info!("Created board {} ({})", board.id, board.name);
    Ok(board)
}

pub fn edit(ctx: &ServiceContext, id: &str, doc: &BoardDoc) -> Result<Board> {
    let mut board = get(ctx, id)?;
    if let Some(ref name) = doc.name {
        require_non_empty(name, "Board name")?;
        BoardRepo::rename(ctx.conn, id, name.trim())?;
        board.name = name.trim().to_string();
        log::info!("Renamed board {} to {}", id, board.name);
    }
    Ok(board)
}

/// Remove an empty board after detaching it from field groups.
///
/// A board that still owns pipelines is refused before anything is touched.
pub fn remove(ctx: &ServiceContext, id: &str) -> Result<Board> {
    let board = get(ctx, id)?;

    let pipelines = BoardRepo::count_pipelines(ctx.conn, id)?;
    if pipelines > 0 {
        return Err(SalesError::validation(format!(
            "Board '{}' still has {} pipeline(s); remove them first",
            board.name, pipelines
        ))
        .into());
    }

    detach_references(ctx, GroupRef::Board, id)?;
    BoardRepo::delete(ctx.conn, id)?;
    log::info!("Removed board {} ({})", board.id, board.name);
    Ok(board)
}

pub fn list(ctx: &ServiceContext) -> Result<Vec<Board>> {
    BoardRepo::list(ctx.conn)
}

pub fn detail(ctx: &ServiceContext, id: &str) -> Result<BoardDetail> {
    let board = get(ctx, id)?;
    let mut pipelines = Vec::new();
    for pipeline in PipelineRepo::list_for_board(ctx.conn, id)? {
        let stages = StageRepo::list_for_pipeline(ctx.conn, &pipeline.id)?;
        pipelines.push(PipelineDetail { pipeline, stages });
    }
    Ok(BoardDetail { board, pipelines })
}

/// Replace the time tracking record of a board item
pub fn update_time_tracking(
    ctx: &ServiceContext,
    id: &str,
    status: TimeTrackStatus,
    time_spent: i64,
    start_date: Option<i64>,
) -> Result<Deal> {
    if time_spent < 0 {
        return Err(SalesError::validation("Time spent cannot be negative").into());
    }

    let mut deal = DealRepo::get_by_id(ctx.conn, id)?
        .ok_or_else(|| SalesError::not_found("Deal", id))?;

    let track = TimeTrack { status, time_spent, start_date };
    DealRepo::set_time_track(ctx.conn, id, &track)?;
    log::info!("Deal {} time tracking {} ({}s)", id, status.as_str(), time_spent);

    deal.time_track = Some(track);
    Ok(deal)
}

/// Export a board with all pipelines and stages as a `sales:board` template
pub fn save_as_template(ctx: &ServiceContext, id: &str, request: &SaveAsTemplate) -> Result<SavedTemplate> {
    let board = get(ctx, id)?;

    let mut pipelines = Vec::new();
    for pipeline in PipelineRepo::list_for_board(ctx.conn, id)? {
        let stages = StageRepo::list_for_pipeline(ctx.conn, &pipeline.id)?;
        pipelines.push(PipelineContent::project(&pipeline, &stages, true));
    }

    let content = BoardContent {
        board: BoardHeader { name: board.name.clone() },
        pipelines,
    };

    let template_id = submit_template(
        ctx,
        request,
        serde_json::to_string(&content)?,
        BOARD_CONTENT_TYPE,
        format!("Template created from board: {}", board.name),
    )?;
    log::info!("Saved board {} as template {}", board.id, template_id);

    Ok(SavedTemplate {
        success: true,
        template_id,
        message: "Board and all pipelines saved as template successfully".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;
    use crate::error::classify;
    use crate::models::{FieldGroup, Pipeline, Stage};
    use crate::repo::{FieldGroupRepo, TemplateRepo};
    use crate::services::deals;

    fn seeded(app: &AppContext) -> (Board, Pipeline) {
        let ctx = app.service();
        let board = add(&ctx, "Enterprise").unwrap();
        let mut pipeline = Pipeline::new(board.id.clone(), "New business".to_string());
        pipeline.order = 1;
        PipelineRepo::create(app.conn(), &pipeline).unwrap();
        for (i, name) in ["Lead", "Won"].iter().enumerate() {
            let mut stage = Stage::new(pipeline.id.clone(), name.to_string());
            stage.order = i as i64;
            StageRepo::create(app.conn(), &stage).unwrap();
        }
        (board, pipeline)
    }

    #[test]
    fn test_add_requires_name() {
        let app = AppContext::in_memory().unwrap();
        let err = add(&app.service(), "  ").unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::Validation(_))));
    }

    #[test]
    fn test_edit_renames() {
        let app = AppContext::in_memory().unwrap();
        let ctx = app.service();
        let board = add(&ctx, "Old").unwrap();
        let edited = edit(&ctx, &board.id, &BoardDoc { name: Some("New".to_string()) }).unwrap();
        assert_eq!(edited.name, "New");
        assert_eq!(get(&ctx, &board.id).unwrap().name, "New");
    }

    #[test]
    fn test_remove_refuses_board_with_pipelines() {
        let app = AppContext::in_memory().unwrap();
        let (board, _) = seeded(&app);
        let mut group = FieldGroup::new("Fields".to_string());
        group.board_ids = vec![board.id.clone()];
        FieldGroupRepo::create(app.conn(), &group).unwrap();

        let err = remove(&app.service(), &board.id).unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::Validation(_))));

        // nothing was cleaned up
        let stored = FieldGroupRepo::get_by_id(app.conn(), &group.id).unwrap().unwrap();
        assert_eq!(stored.board_ids, vec![board.id.clone()]);
    }

    #[test]
    fn test_remove_detaches_and_deletes() {
        let app = AppContext::in_memory().unwrap();
        let ctx = app.service();
        let board = add(&ctx, "Empty").unwrap();
        let other = add(&ctx, "Other").unwrap();
        let mut group = FieldGroup::new("Fields".to_string());
        group.board_ids = vec![board.id.clone(), other.id.clone()];
        FieldGroupRepo::create(app.conn(), &group).unwrap();

        remove(&ctx, &board.id).unwrap();

        assert!(BoardRepo::get_by_id(app.conn(), &board.id).unwrap().is_none());
        assert!(BoardRepo::get_by_id(app.conn(), &other.id).unwrap().is_some());
        let stored = FieldGroupRepo::get_by_id(app.conn(), &group.id).unwrap().unwrap();
        assert_eq!(stored.board_ids, vec![other.id.clone()]);
    }

    #[test]
    fn test_remove_missing_board() {
        let app = AppContext::in_memory().unwrap();
        let err = remove(&app.service(), "nope").unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::NotFound { kind: "Board", .. })));
    }

    #[test]
    fn test_detail_includes_stages() {
        let app = AppContext::in_memory().unwrap();
        let (board, pipeline) = seeded(&app);
        let detail = detail(&app.service(), &board.id).unwrap();
        assert_eq!(detail.pipelines.len(), 1);
        assert_eq!(detail.pipelines[0].pipeline.id, pipeline.id);
        assert_eq!(detail.pipelines[0].stages.len(), 2);
    }

    #[test]
    fn test_save_as_template() {
        let app = AppContext::in_memory().unwrap();
        let (board, _) = seeded(&app);

        let saved = save_as_template(&app.service(), &board.id, &SaveAsTemplate {
            name: "Enterprise template".to_string(),
            ..Default::default()
        }).unwrap();
        assert!(saved.success);
        assert_eq!(saved.message, "Board and all pipelines saved as template successfully");

        let template = TemplateRepo::get_by_id(app.conn(), &saved.template_id).unwrap().unwrap();
        assert_eq!(template.content_type.as_deref(), Some(BOARD_CONTENT_TYPE));
        assert_eq!(template.plugin_type.as_deref(), Some("sales"));
        assert_eq!(template.description.as_deref(), Some("Template created from board: Enterprise"));

        let content: BoardContent = serde_json::from_str(&template.content).unwrap();
        assert_eq!(content.board.name, "Enterprise");
        assert_eq!(content.pipelines.len(), 1);
        assert_eq!(content.pipelines[0].order, Some(1));
        let stage_names: Vec<&str> = content.pipelines[0].stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(stage_names, vec!["Lead", "Won"]);
    }

    #[test]
    fn test_save_as_template_requires_name() {
        let app = AppContext::in_memory().unwrap();
        let (board, _) = seeded(&app);
        let err = save_as_template(&app.service(), &board.id, &SaveAsTemplate::default()).unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::Validation(_))));
    }

    #[test]
    fn test_update_time_tracking() {
        let app = AppContext::in_memory().unwrap();
        let (_, pipeline) = seeded(&app);
        let ctx = app.service();
        let stage = &StageRepo::list_for_pipeline(app.conn(), &pipeline.id).unwrap()[0];
        let deal = deals::add(&ctx, &stage.id, "Acme renewal").unwrap();

        let updated = update_time_tracking(&ctx, &deal.id, TimeTrackStatus::Paused, 90, Some(1000)).unwrap();
        assert_eq!(updated.time_track.as_ref().unwrap().time_spent, 90);

        let stored = deals::get(&ctx, &deal.id).unwrap();
        assert_eq!(stored.time_track, updated.time_track);

        let err = update_time_tracking(&ctx, "missing", TimeTrackStatus::Started, 0, None).unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::NotFound { kind: "Deal", .. })));
    }
}
