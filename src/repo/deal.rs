use rusqlite::{Connection, OptionalExtension};
use crate::models::{Deal, TimeTrack, TimeTrackStatus};
use anyhow::{Context, Result};

pub struct DealRepo;

impl DealRepo {
    /// Insert a deal record
    pub fn create(conn: &Connection, deal: &Deal) -> Result<()> {
        conn.execute(
            "INSERT INTO deals (id, stage_id, name, time_track_status, time_spent,
                time_track_start_ts, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                deal.id,
                deal.stage_id,
                deal.name,
                deal.time_track.as_ref().map(|t| t.status.as_str()),
                deal.time_track.as_ref().map(|t| t.time_spent),
                deal.time_track.as_ref().and_then(|t| t.start_date),
                deal.created_ts,
                deal.modified_ts
            ],
        )
        .with_context(|| format!("Failed to create deal: {}", deal.name))?;
        Ok(())
    }

    /// Get deal by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Deal>> {
        let mut stmt = conn.prepare(
            "SELECT id, stage_id, name, time_track_status, time_spent, time_track_start_ts,
                    created_ts, modified_ts
             FROM deals WHERE id = ?1"
        )?;

        let deal = stmt.query_row([id], |row| {
            let status: Option<String> = row.get(3)?;
            let time_track = status
                .as_deref()
                .and_then(TimeTrackStatus::from_str)
                .map(|status| -> rusqlite::Result<TimeTrack> {
                    Ok(TimeTrack {
                        status,
                        time_spent: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
                        start_date: row.get(5)?,
                    })
                })
                .transpose()?;
            Ok(Deal {
                id: row.get(0)?,
                stage_id: row.get(1)?,
                name: row.get(2)?,
                time_track,
                created_ts: row.get(6)?,
                modified_ts: row.get(7)?,
            })
        }).optional()?;

        Ok(deal)
    }

    /// Replace the time tracking record of a deal
    pub fn set_time_track(conn: &Connection, id: &str, track: &TimeTrack) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE deals SET time_track_status = ?1, time_spent = ?2, time_track_start_ts = ?3,
                modified_ts = ?4
             WHERE id = ?5",
            rusqlite::params![track.status.as_str(), track.time_spent, track.start_date, now, id],
        )
        .with_context(|| format!("Failed to update time tracking for deal {}", id))?;

        if updated == 0 {
            anyhow::bail!("No deal found with id={}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::models::{Board, Pipeline, Stage};
    use crate::repo::{BoardRepo, PipelineRepo, StageRepo};

    #[test]
    fn test_time_track_roundtrip() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let board = Board::new("Main".to_string(), None);
        BoardRepo::create(&conn, &board).unwrap();
        let pipeline = Pipeline::new(board.id, "Sales".to_string());
        PipelineRepo::create(&conn, &pipeline).unwrap();
        let stage = Stage::new(pipeline.id, "Lead".to_string());
        StageRepo::create(&conn, &stage).unwrap();

        let deal = Deal::new(stage.id, "Acme renewal".to_string());
        DealRepo::create(&conn, &deal).unwrap();
        assert!(DealRepo::get_by_id(&conn, &deal.id).unwrap().unwrap().time_track.is_none());

        let track = TimeTrack {
            status: TimeTrackStatus::Paused,
            time_spent: 5400,
            start_date: Some(1_700_000_000),
        };
        DealRepo::set_time_track(&conn, &deal.id, &track).unwrap();

        let loaded = DealRepo::get_by_id(&conn, &deal.id).unwrap().unwrap();
        assert_eq!(loaded.time_track, Some(track));
    }
}
