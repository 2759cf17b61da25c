use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{TemplateCategory, TemplateStatus};
use anyhow::{Context, Result};

const CATEGORY_COLUMNS: &str =
    "id, name, code, parent_id, content_type, sort_order, status, created_by, updated_by,
     created_ts, modified_ts";

fn category_from_row(row: &Row) -> rusqlite::Result<TemplateCategory> {
    let status: String = row.get(6)?;
    Ok(TemplateCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        parent_id: row.get(3)?,
        content_type: row.get(4)?,
        order: row.get(5)?,
        status: TemplateStatus::from_str(&status).unwrap_or(TemplateStatus::Active),
        created_by: row.get(7)?,
        updated_by: row.get(8)?,
        created_ts: row.get(9)?,
        modified_ts: row.get(10)?,
    })
}

pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a category record
    pub fn create(conn: &Connection, category: &TemplateCategory) -> Result<()> {
        conn.execute(
            "INSERT INTO template_categories (id, name, code, parent_id, content_type, sort_order,
                status, created_by, updated_by, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                category.id,
                category.name,
                category.code,
                category.parent_id,
                category.content_type,
                category.order,
                category.status.as_str(),
                category.created_by,
                category.updated_by,
                category.created_ts,
                category.modified_ts
            ],
        )
        .with_context(|| format!("Failed to create category: {}", category.code))?;
        Ok(())
    }

    /// Get category by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<TemplateCategory>> {
        let sql = format!("SELECT {} FROM template_categories WHERE id = ?1", CATEGORY_COLUMNS);
        let category = conn.query_row(&sql, [id], category_from_row).optional()?;
        Ok(category)
    }

    /// Get category by its unique code
    pub fn get_by_code(conn: &Connection, code: &str) -> Result<Option<TemplateCategory>> {
        let sql = format!("SELECT {} FROM template_categories WHERE code = ?1", CATEGORY_COLUMNS);
        let category = conn.query_row(&sql, [code], category_from_row).optional()?;
        Ok(category)
    }

    /// Non-inactive categories, optionally limited to one content type, newest first
    pub fn list(conn: &Connection, content_type: Option<&str>) -> Result<Vec<TemplateCategory>> {
        let mut categories = Vec::new();

        match content_type {
            Some(content_type) => {
                let sql = format!(
                    "SELECT {} FROM template_categories
                     WHERE status != 'inactive' AND content_type = ?1
                     ORDER BY created_ts DESC, rowid DESC",
                    CATEGORY_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([content_type], category_from_row)?;
                for row in rows {
                    categories.push(row?);
                }
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM template_categories
                     WHERE status != 'inactive'
                     ORDER BY created_ts DESC, rowid DESC",
                    CATEGORY_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], category_from_row)?;
                for row in rows {
                    categories.push(row?);
                }
            }
        }

        Ok(categories)
    }

    /// Write every mutable column of the category back to the store
    pub fn update(conn: &Connection, category: &TemplateCategory) -> Result<()> {
        let updated = conn.execute(
            "UPDATE template_categories SET name = ?1, code = ?2, parent_id = ?3,
                content_type = ?4, sort_order = ?5, status = ?6, updated_by = ?7, modified_ts = ?8
             WHERE id = ?9",
            rusqlite::params![
                category.name,
                category.code,
                category.parent_id,
                category.content_type,
                category.order,
                category.status.as_str(),
                category.updated_by,
                category.modified_ts,
                category.id
            ],
        )
        .with_context(|| format!("Failed to update category {}", category.id))?;

        if updated == 0 {
            anyhow::bail!("No category found with id={}", category.id);
        }
        Ok(())
    }

    /// Number of direct children of a category
    pub fn count_children(conn: &Connection, id: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM template_categories WHERE parent_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a category
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM template_categories WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete category {}", id))?;
        Ok(deleted > 0)
    }
}
