use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::Board;
use anyhow::{Context, Result};

const BOARD_COLUMNS: &str = "id, name, user_id, created_ts, modified_ts";

fn board_from_row(row: &Row) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        name: row.get(1)?,
        user_id: row.get(2)?,
        created_ts: row.get(3)?,
        modified_ts: row.get(4)?,
    })
}

/// Board repository for database operations
pub struct BoardRepo;

impl BoardRepo {
    /// Insert a board record
    pub fn create(conn: &Connection, board: &Board) -> Result<()> {
        conn.execute(
            "INSERT INTO boards (id, name, user_id, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                board.id,
                board.name,
                board.user_id,
                board.created_ts,
                board.modified_ts
            ],
        )
        .with_context(|| format!("Failed to create board: {}", board.name))?;
        Ok(())
    }

    /// Get board by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Board>> {
        let sql = format!("SELECT {} FROM boards WHERE id = ?1", BOARD_COLUMNS);
        let board = conn.query_row(&sql, [id], board_from_row).optional()?;
        Ok(board)
    }

    /// List all boards, oldest first
    pub fn list(conn: &Connection) -> Result<Vec<Board>> {
        let sql = format!("SELECT {} FROM boards ORDER BY created_ts, rowid", BOARD_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], board_from_row)?;

        let mut boards = Vec::new();
        for row in rows {
            boards.push(row?);
        }
        Ok(boards)
    }

    /// Rename a board
    pub fn rename(conn: &Connection, id: &str, name: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE boards SET name = ?1, modified_ts = ?2 WHERE id = ?3",
            rusqlite::params![name, now, id],
        )
        .with_context(|| format!("Failed to update board {}", id))?;

        if updated == 0 {
            anyhow::bail!("No board found with id={}", id);
        }
        Ok(())
    }

    /// Number of pipelines owned by the board
    pub fn count_pipelines(conn: &Connection, id: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM pipelines WHERE board_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a board; returns whether a row was removed
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM boards WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete board {}", id))?;
        Ok(deleted > 0)
    }
}
