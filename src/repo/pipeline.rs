use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{Pipeline, RecordStatus, Visibility};
use anyhow::{Context, Result};

const PIPELINE_COLUMNS: &str =
    "id, board_id, name, status, visibility, bg_color, start_date, end_date, metric,
     hack_scoring_type, is_check_date, is_check_user, is_check_department,
     number_config, number_size, name_config, sort_order, user_id, created_ts, modified_ts,
     watched_user_ids_json";

fn pipeline_from_row(row: &Row) -> rusqlite::Result<Pipeline> {
    let status: String = row.get(3)?;
    let visibility: String = row.get(4)?;
    let watchers: String = row.get(20)?;
    let watched_user_ids = serde_json::from_str(&watchers)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(20, Type::Text, Box::new(e)))?;
    Ok(Pipeline {
        id: row.get(0)?,
        board_id: row.get(1)?,
        name: row.get(2)?,
        status: RecordStatus::from_str(&status).unwrap_or(RecordStatus::Active),
        visibility: Visibility::from_str(&visibility).unwrap_or(Visibility::Public),
        bg_color: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        metric: row.get(8)?,
        hack_scoring_type: row.get(9)?,
        is_check_date: row.get::<_, i64>(10)? != 0,
        is_check_user: row.get::<_, i64>(11)? != 0,
        is_check_department: row.get::<_, i64>(12)? != 0,
        number_config: row.get(13)?,
        number_size: row.get(14)?,
        name_config: row.get(15)?,
        order: row.get(16)?,
        user_id: row.get(17)?,
        watched_user_ids,
        created_ts: row.get(18)?,
        modified_ts: row.get(19)?,
    })
}

/// Pipeline repository for database operations
pub struct PipelineRepo;

impl PipelineRepo {
    /// Insert a pipeline record
    pub fn create(conn: &Connection, pipeline: &Pipeline) -> Result<()> {
        conn.execute(
            "INSERT INTO pipelines (id, board_id, name, status, visibility, bg_color, start_date,
                end_date, metric, hack_scoring_type, is_check_date, is_check_user,
                is_check_department, number_config, number_size, name_config, sort_order,
                user_id, created_ts, modified_ts, watched_user_ids_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                ?17, ?18, ?19, ?20, ?21)",
            rusqlite::params![
                pipeline.id,
                pipeline.board_id,
                pipeline.name,
                pipeline.status.as_str(),
                pipeline.visibility.as_str(),
                pipeline.bg_color,
                pipeline.start_date,
                pipeline.end_date,
                pipeline.metric,
                pipeline.hack_scoring_type,
                pipeline.is_check_date as i64,
                pipeline.is_check_user as i64,
                pipeline.is_check_department as i64,
                pipeline.number_config,
                pipeline.number_size,
                pipeline.name_config,
                pipeline.order,
                pipeline.user_id,
                pipeline.created_ts,
                pipeline.modified_ts,
                serde_json::to_string(&pipeline.watched_user_ids)?
            ],
        )
        .with_context(|| format!("Failed to create pipeline: {}", pipeline.name))?;
        Ok(())
    }

    /// Get pipeline by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Pipeline>> {
        let sql = format!("SELECT {} FROM pipelines WHERE id = ?1", PIPELINE_COLUMNS);
        let pipeline = conn.query_row(&sql, [id], pipeline_from_row).optional()?;
        Ok(pipeline)
    }

    /// List the pipelines of a board ordered by their ordering index
    pub fn list_for_board(conn: &Connection, board_id: &str) -> Result<Vec<Pipeline>> {
        let sql = format!(
            "SELECT {} FROM pipelines WHERE board_id = ?1 ORDER BY sort_order, created_ts, rowid",
            PIPELINE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([board_id], pipeline_from_row)?;

        let mut pipelines = Vec::new();
        for row in rows {
            pipelines.push(row?);
        }
        Ok(pipelines)
    }

    /// Write every mutable column of the pipeline back to the store
    pub fn update(conn: &Connection, pipeline: &Pipeline) -> Result<()> {
        let updated = conn.execute(
            "UPDATE pipelines SET board_id = ?1, name = ?2, status = ?3, visibility = ?4,
                bg_color = ?5, start_date = ?6, end_date = ?7, metric = ?8,
                hack_scoring_type = ?9, is_check_date = ?10, is_check_user = ?11,
                is_check_department = ?12, number_config = ?13, number_size = ?14,
                name_config = ?15, sort_order = ?16, modified_ts = ?17
             WHERE id = ?18",
            rusqlite::params![
                pipeline.board_id,
                pipeline.name,
                pipeline.status.as_str(),
                pipeline.visibility.as_str(),
                pipeline.bg_color,
                pipeline.start_date,
                pipeline.end_date,
                pipeline.metric,
                pipeline.hack_scoring_type,
                pipeline.is_check_date as i64,
                pipeline.is_check_user as i64,
                pipeline.is_check_department as i64,
                pipeline.number_config,
                pipeline.number_size,
                pipeline.name_config,
                pipeline.order,
                pipeline.modified_ts,
                pipeline.id
            ],
        )
        .with_context(|| format!("Failed to update pipeline {}", pipeline.id))?;

        if updated == 0 {
            anyhow::bail!("No pipeline found with id={}", pipeline.id);
        }
        Ok(())
    }

    /// Set pipeline status
    pub fn set_status(conn: &Connection, id: &str, status: RecordStatus) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE pipelines SET status = ?1, modified_ts = ?2 WHERE id = ?3",
            rusqlite::params![status.as_str(), now, id],
        )?;

        if updated == 0 {
            anyhow::bail!("No pipeline found with id={}", id);
        }
        Ok(())
    }

    /// Move a pipeline to position `order`; returns false when no such pipeline exists
    pub fn set_order(conn: &Connection, id: &str, order: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE pipelines SET sort_order = ?1, modified_ts = ?2 WHERE id = ?3",
            rusqlite::params![order, now, id],
        )
        .with_context(|| format!("Failed to reorder pipeline {}", id))?;
        Ok(updated > 0)
    }

    /// Replace the watcher list of a pipeline
    pub fn set_watchers(conn: &Connection, id: &str, user_ids: &[String]) -> Result<()> {
        let updated = conn.execute(
            "UPDATE pipelines SET watched_user_ids_json = ?1 WHERE id = ?2",
            rusqlite::params![serde_json::to_string(user_ids)?, id],
        )
        .with_context(|| format!("Failed to update watchers of pipeline {}", id))?;

        if updated == 0 {
            anyhow::bail!("No pipeline found with id={}", id);
        }
        Ok(())
    }

    /// Delete a pipeline (stages and their deals go with it)
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM pipelines WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete pipeline {}", id))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::models::Board;
    use crate::repo::BoardRepo;

    fn setup() -> (Connection, Board) {
        let conn = DbConnection::connect_in_memory().unwrap();
        let board = Board::new("Main".to_string(), None);
        BoardRepo::create(&conn, &board).unwrap();
        (conn, board)
    }

    #[test]
    fn test_create_roundtrips_all_fields() {
        let (conn, board) = setup();
        let mut pipeline = Pipeline::new(board.id.clone(), "Sales".to_string());
        pipeline.visibility = Visibility::Private;
        pipeline.bg_color = Some("#5fd".to_string());
        pipeline.start_date = Some(1_700_000_000);
        pipeline.is_check_department = true;
        pipeline.number_config = Some("{year}-".to_string());
        pipeline.number_size = Some("4".to_string());
        pipeline.order = 3;
        pipeline.watched_user_ids = vec!["u1".to_string()];
        PipelineRepo::create(&conn, &pipeline).unwrap();

        let loaded = PipelineRepo::get_by_id(&conn, &pipeline.id).unwrap().unwrap();
        assert_eq!(loaded, pipeline);
    }

    #[test]
    fn test_list_for_board_orders_by_index() {
        let (conn, board) = setup();
        let mut second = Pipeline::new(board.id.clone(), "Second".to_string());
        second.order = 2;
        let mut first = Pipeline::new(board.id.clone(), "First".to_string());
        first.order = 1;
        PipelineRepo::create(&conn, &second).unwrap();
        PipelineRepo::create(&conn, &first).unwrap();

        let names: Vec<String> = PipelineRepo::list_for_board(&conn, &board.id)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_set_status() {
        let (conn, board) = setup();
        let pipeline = Pipeline::new(board.id.clone(), "Sales".to_string());
        PipelineRepo::create(&conn, &pipeline).unwrap();

        PipelineRepo::set_status(&conn, &pipeline.id, RecordStatus::Archived).unwrap();
        let loaded = PipelineRepo::get_by_id(&conn, &pipeline.id).unwrap().unwrap();
        assert_eq!(loaded.status, RecordStatus::Archived);

        assert!(PipelineRepo::set_status(&conn, "missing", RecordStatus::Active).is_err());
    }

    #[test]
    fn test_set_order_and_watchers() {
        let (conn, board) = setup();
        let pipeline = Pipeline::new(board.id.clone(), "Sales".to_string());
        PipelineRepo::create(&conn, &pipeline).unwrap();

        assert!(PipelineRepo::set_order(&conn, &pipeline.id, 7).unwrap());
        assert!(!PipelineRepo::set_order(&conn, "missing", 1).unwrap());

        let watchers = vec!["u1".to_string(), "u2".to_string()];
        PipelineRepo::set_watchers(&conn, &pipeline.id, &watchers).unwrap();
        let loaded = PipelineRepo::get_by_id(&conn, &pipeline.id).unwrap().unwrap();
        assert_eq!(loaded.order, 7);
        assert_eq!(loaded.watched_user_ids, watchers);
        assert!(PipelineRepo::set_watchers(&conn, "missing", &watchers).is_err());
    }
}
