use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{Template, TemplateStatus};
use anyhow::{Context, Result};

const TEMPLATE_COLUMNS: &str =
    "id, name, content, content_type, plugin_type, description, category, status,
     created_by, updated_by, created_ts, modified_ts";

fn template_from_row(row: &Row) -> rusqlite::Result<Template> {
    let status: String = row.get(7)?;
    Ok(Template {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        content_type: row.get(3)?,
        plugin_type: row.get(4)?,
        description: row.get(5)?,
        category: row.get(6)?,
        status: TemplateStatus::from_str(&status).unwrap_or(TemplateStatus::Active),
        created_by: row.get(8)?,
        updated_by: row.get(9)?,
        created_ts: row.get(10)?,
        modified_ts: row.get(11)?,
    })
}

/// Store-level selection for template listing.
/// Text search is applied by the caller on the returned rows.
#[derive(Debug, Clone, Default)]
pub struct TemplateQuery {
    /// Exact status; `None` selects everything except `inactive`
    pub status: Option<TemplateStatus>,
    /// Category membership; empty means any category
    pub category_ids: Vec<String>,
    pub content_type: Option<String>,
}

/// Template repository for database operations
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a template record
    pub fn create(conn: &Connection, template: &Template) -> Result<()> {
        conn.execute(
            "INSERT INTO templates (id, name, content, content_type, plugin_type, description,
                category, status, created_by, updated_by, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                template.id,
                template.name,
                template.content,
                template.content_type,
                template.plugin_type,
                template.description,
                template.category,
                template.status.as_str(),
                template.created_by,
                template.updated_by,
                template.created_ts,
                template.modified_ts
            ],
        )
        .with_context(|| format!("Failed to create template: {}", template.name))?;
        Ok(())
    }

    /// Get template by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Template>> {
        let sql = format!("SELECT {} FROM templates WHERE id = ?1", TEMPLATE_COLUMNS);
        let template = conn.query_row(&sql, [id], template_from_row).optional()?;
        Ok(template)
    }

    /// Write every mutable column of the template back to the store
    pub fn update(conn: &Connection, template: &Template) -> Result<()> {
        let updated = conn.execute(
            "UPDATE templates SET name = ?1, content = ?2, content_type = ?3, plugin_type = ?4,
                description = ?5, category = ?6, status = ?7, updated_by = ?8, modified_ts = ?9
             WHERE id = ?10",
            rusqlite::params![
                template.name,
                template.content,
                template.content_type,
                template.plugin_type,
                template.description,
                template.category,
                template.status.as_str(),
                template.updated_by,
                template.modified_ts,
                template.id
            ],
        )
        .with_context(|| format!("Failed to update template {}", template.id))?;

        if updated == 0 {
            anyhow::bail!("No template found with id={}", template.id);
        }
        Ok(())
    }

    /// Delete a template
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM templates WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete template {}", id))?;
        Ok(deleted > 0)
    }

    /// Templates matching the query, newest first
    pub fn list(conn: &Connection, query: &TemplateQuery) -> Result<Vec<Template>> {
        let mut clauses = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        match query.status {
            Some(status) => {
                params.push(Box::new(status.as_str()));
                clauses.push(format!("status = ?{}", params.len()));
            }
            None => clauses.push("status != 'inactive'".to_string()),
        }

        if !query.category_ids.is_empty() {
            let mut placeholders = Vec::new();
            for id in &query.category_ids {
                params.push(Box::new(id.clone()));
                placeholders.push(format!("?{}", params.len()));
            }
            clauses.push(format!("category IN ({})", placeholders.join(", ")));
        }

        if let Some(ref content_type) = query.content_type {
            params.push(Box::new(content_type.clone()));
            clauses.push(format!("content_type = ?{}", params.len()));
        }

        let sql = format!(
            "SELECT {} FROM templates WHERE {} ORDER BY created_ts DESC, rowid DESC",
            TEMPLATE_COLUMNS,
            clauses.join(" AND ")
        );

        let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), template_from_row)?;

        let mut templates = Vec::new();
        for row in rows {
            templates.push(row?);
        }
        Ok(templates)
    }

    /// Distinct non-empty content types in use
    pub fn distinct_content_types(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT content_type FROM templates
             WHERE content_type IS NOT NULL AND content_type != ''
             ORDER BY content_type"
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut types = Vec::new();
        for row in rows {
            types.push(row?);
        }
        Ok(types)
    }

    /// Detach every template from a category
    pub fn clear_category(conn: &Connection, category_id: &str) -> Result<usize> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE templates SET category = NULL, modified_ts = ?1 WHERE category = ?2",
            rusqlite::params![now, category_id],
        )?;
        Ok(updated)
    }
}
