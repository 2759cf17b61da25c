use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{FieldGroup, GroupRef};
use anyhow::{Context, Result};

fn group_from_row(row: &Row) -> rusqlite::Result<(FieldGroup, String, String)> {
    Ok((
        FieldGroup {
            id: row.get(0)?,
            name: row.get(1)?,
            board_ids: Vec::new(),
            pipeline_ids: Vec::new(),
        },
        row.get(2)?,
        row.get(3)?,
    ))
}

fn decode(raw: (FieldGroup, String, String)) -> Result<FieldGroup> {
    let (mut group, board_ids, pipeline_ids) = raw;
    group.board_ids = serde_json::from_str(&board_ids)
        .with_context(|| format!("Corrupt board_ids_json for field group {}", group.id))?;
    group.pipeline_ids = serde_json::from_str(&pipeline_ids)
        .with_context(|| format!("Corrupt pipeline_ids_json for field group {}", group.id))?;
    Ok(group)
}

/// Field group repository backing the core service
pub struct FieldGroupRepo;

impl FieldGroupRepo {
    /// Insert a field group
    pub fn create(conn: &Connection, group: &FieldGroup) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO field_groups (id, name, board_ids_json, pipeline_ids_json, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                group.id,
                group.name,
                serde_json::to_string(&group.board_ids)?,
                serde_json::to_string(&group.pipeline_ids)?,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create field group: {}", group.name))?;
        Ok(())
    }

    /// Get field group by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<FieldGroup>> {
        let raw = conn.query_row(
            "SELECT id, name, board_ids_json, pipeline_ids_json FROM field_groups WHERE id = ?1",
            [id],
            group_from_row,
        ).optional()?;
        raw.map(decode).transpose()
    }

    /// All field groups, oldest first
    pub fn list(conn: &Connection) -> Result<Vec<FieldGroup>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, board_ids_json, pipeline_ids_json FROM field_groups
             ORDER BY created_ts, rowid"
        )?;
        let rows = stmt.query_map([], group_from_row)?;

        let mut groups = Vec::new();
        for row in rows {
            groups.push(decode(row?)?);
        }
        Ok(groups)
    }

    /// Field groups whose reference list contains `id`
    pub fn find_referencing(conn: &Connection, kind: GroupRef, id: &str) -> Result<Vec<FieldGroup>> {
        let groups = Self::list(conn)?
            .into_iter()
            .filter(|g| kind.ids(g).iter().any(|e| e == id))
            .collect();
        Ok(groups)
    }

    /// Replace name and reference lists of a field group
    pub fn update(conn: &Connection, group: &FieldGroup) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE field_groups SET name = ?1, board_ids_json = ?2, pipeline_ids_json = ?3,
                modified_ts = ?4
             WHERE id = ?5",
            rusqlite::params![
                group.name,
                serde_json::to_string(&group.board_ids)?,
                serde_json::to_string(&group.pipeline_ids)?,
                now,
                group.id
            ],
        )
        .with_context(|| format!("Failed to update field group {}", group.id))?;

        if updated == 0 {
            anyhow::bail!("No field group found with id={}", group.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    #[test]
    fn test_find_referencing() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let mut a = FieldGroup::new("A".to_string());
        a.board_ids = vec!["b1".to_string()];
        let mut b = FieldGroup::new("B".to_string());
        b.board_ids = vec!["b2".to_string()];
        b.pipeline_ids = vec!["b1".to_string()];
        FieldGroupRepo::create(&conn, &a).unwrap();
        FieldGroupRepo::create(&conn, &b).unwrap();

        let by_board = FieldGroupRepo::find_referencing(&conn, GroupRef::Board, "b1").unwrap();
        assert_eq!(by_board, vec![a.clone()]);
        let by_pipeline = FieldGroupRepo::find_referencing(&conn, GroupRef::Pipeline, "b1").unwrap();
        assert_eq!(by_pipeline, vec![b.clone()]);
    }

    #[test]
    fn test_update_roundtrip() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let mut group = FieldGroup::new("A".to_string());
        group.pipeline_ids = vec!["p1".to_string(), "p2".to_string()];
        FieldGroupRepo::create(&conn, &group).unwrap();

        group.pipeline_ids.retain(|p| p != "p1");
        FieldGroupRepo::update(&conn, &group).unwrap();

        assert_eq!(FieldGroupRepo::get_by_id(&conn, &group.id).unwrap().unwrap(), group);
    }
}
