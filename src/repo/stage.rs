use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{RecordStatus, Stage};
use anyhow::{Context, Result};

const STAGE_COLUMNS: &str =
    "id, pipeline_id, name, probability, status, sort_order, created_ts, modified_ts";

fn stage_from_row(row: &Row) -> rusqlite::Result<Stage> {
    let status: String = row.get(4)?;
    Ok(Stage {
        id: row.get(0)?,
        pipeline_id: row.get(1)?,
        name: row.get(2)?,
        probability: row.get(3)?,
        status: RecordStatus::from_str(&status).unwrap_or(RecordStatus::Active),
        order: row.get(5)?,
        created_ts: row.get(6)?,
        modified_ts: row.get(7)?,
    })
}

pub struct StageRepo;

impl StageRepo {
    /// Insert a stage record
    pub fn create(conn: &Connection, stage: &Stage) -> Result<()> {
        conn.execute(
            "INSERT INTO stages (id, pipeline_id, name, probability, status, sort_order,
                created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                stage.id,
                stage.pipeline_id,
                stage.name,
                stage.probability,
                stage.status.as_str(),
                stage.order,
                stage.created_ts,
                stage.modified_ts
            ],
        )
        .with_context(|| format!("Failed to create stage: {}", stage.name))?;
        Ok(())
    }

    /// Get stage by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Stage>> {
        let sql = format!("SELECT {} FROM stages WHERE id = ?1", STAGE_COLUMNS);
        let stage = conn.query_row(&sql, [id], stage_from_row).optional()?;
        Ok(stage)
    }

    /// List the stages of a pipeline ordered by their ordering index
    pub fn list_for_pipeline(conn: &Connection, pipeline_id: &str) -> Result<Vec<Stage>> {
        let sql = format!(
            "SELECT {} FROM stages WHERE pipeline_id = ?1 ORDER BY sort_order, created_ts, rowid",
            STAGE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([pipeline_id], stage_from_row)?;

        let mut stages = Vec::new();
        for row in rows {
            stages.push(row?);
        }
        Ok(stages)
    }

    /// Update name, probability, status and ordering of a stage
    pub fn update(conn: &Connection, stage: &Stage) -> Result<()> {
        let updated = conn.execute(
            "UPDATE stages SET name = ?1, probability = ?2, status = ?3, sort_order = ?4,
                modified_ts = ?5
             WHERE id = ?6",
            rusqlite::params![
                stage.name,
                stage.probability,
                stage.status.as_str(),
                stage.order,
                stage.modified_ts,
                stage.id
            ],
        )
        .with_context(|| format!("Failed to update stage {}", stage.id))?;

        if updated == 0 {
            anyhow::bail!("No stage found with id={}", stage.id);
        }
        Ok(())
    }

    /// Delete a stage
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM stages WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete stage {}", id))?;
        Ok(deleted > 0)
    }
}
