use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashSet;
use crate::context::ServiceContext;
use crate::error::SalesError;
use crate::models::{CategoryDoc, TemplateCategory};
use crate::repo::{CategoryRepo, TemplateRepo};
use super::require;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPage {
    pub list: Vec<TemplateCategory>,
    pub total_count: usize,
}

pub fn get(ctx: &ServiceContext, id: &str) -> Result<TemplateCategory> {
    CategoryRepo::get_by_id(ctx.conn, id)?
        .ok_or_else(|| SalesError::not_found("Category", id).into())
}

/// Category codes: letters, digits, hyphen, underscore and dot
fn validate_code(code: &str) -> Result<()> {
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) {
        return Err(SalesError::validation(format!(
            "Invalid category code '{}'. Use letters, digits, '-', '_' or '.'",
            code
        ))
        .into());
    }
    Ok(())
}

fn ensure_unique_code(conn: &Connection, code: &str, own_id: Option<&str>) -> Result<()> {
    if let Some(existing) = CategoryRepo::get_by_code(conn, code)? {
        if own_id != Some(existing.id.as_str()) {
            return Err(SalesError::validation(format!("Category code '{}' is already in use", code)).into());
        }
    }
    Ok(())
}

/// The parent must exist and, when editing, must not sit below the category itself
fn check_parent(conn: &Connection, own_id: Option<&str>, parent_id: &str) -> Result<()> {
    let mut seen = HashSet::new();
    let mut cursor = Some(parent_id.to_string());

    while let Some(id) = cursor {
        if own_id == Some(id.as_str()) {
            return Err(SalesError::validation("A category cannot be nested under itself").into());
        }
        if !seen.insert(id.clone()) {
            break;
        }
        let node = CategoryRepo::get_by_id(conn, &id)?
            .ok_or_else(|| SalesError::not_found("Category", id.as_str()))?;
        cursor = node.parent_id;
    }
    Ok(())
}

/// Non-inactive categories, newest first, optionally limited to one content type
pub fn list(ctx: &ServiceContext, content_type: Option<&str>) -> Result<CategoryPage> {
    let list = CategoryRepo::list(ctx.conn, content_type)?;
    Ok(CategoryPage { total_count: list.len(), list })
}

pub fn add(ctx: &ServiceContext, doc: &CategoryDoc) -> Result<TemplateCategory> {
    let name = require(doc.name.as_deref(), "Category name")?;
    let code = require(doc.code.as_deref(), "Category code")?;
    let content_type = require(doc.content_type.as_deref(), "Category content type")?;
    validate_code(code)?;
    ensure_unique_code(ctx.conn, code, None)?;
    if let Some(ref parent_id) = doc.parent_id {
        check_parent(ctx.conn, None, parent_id)?;
    }

    let mut category = TemplateCategory::new(name.to_string(), code.to_string(), content_type.to_string());
    category.parent_id = doc.parent_id.clone();
    category.order = doc.order.clone();
    if let Some(status) = doc.status {
        category.status = status;
    }
    category.created_by = ctx.user_owned();
    CategoryRepo::create(ctx.conn, &category)?;

    log::info!("Created category {} ({})", category.id, category.code);
    Ok(category)
}

pub fn edit(ctx: &ServiceContext, id: &str, doc: &CategoryDoc) -> Result<TemplateCategory> {
    let mut category = get(ctx, id)?;

    if let Some(ref name) = doc.name {
        category.name = require(Some(name.as_str()), "Category name")?.to_string();
    }
    if let Some(ref code) = doc.code {
        let code = require(Some(code.as_str()), "Category code")?;
        validate_code(code)?;
        ensure_unique_code(ctx.conn, code, Some(id))?;
        category.code = code.to_string();
    }
    if let Some(ref content_type) = doc.content_type {
        category.content_type = require(Some(content_type.as_str()), "Category content type")?.to_string();
    }
    if let Some(ref parent_id) = doc.parent_id {
        check_parent(ctx.conn, Some(id), parent_id)?;
        category.parent_id = Some(parent_id.clone());
    }
    if doc.order.is_some() {
        category.order = doc.order.clone();
    }
    if let Some(status) = doc.status {
        category.status = status;
    }
    category.updated_by = ctx.user_owned();
    category.modified_ts = chrono::Utc::now().timestamp();
    CategoryRepo::update(ctx.conn, &category)?;

    log::info!("Updated category {}", id);
    Ok(category)
}

/// Remove a leaf category; its templates become uncategorized
pub fn remove(ctx: &ServiceContext, id: &str) -> Result<TemplateCategory> {
    let category = get(ctx, id)?;

    let children = CategoryRepo::count_children(ctx.conn, id)?;
    if children > 0 {
        return Err(SalesError::validation(format!(
            "Category '{}' has {} child categor{}; remove them first",
            category.code,
            children,
            if children == 1 { "y" } else { "ies" }
        ))
        .into());
    }

    let tx = ctx.conn.unchecked_transaction()?;
    let detached = TemplateRepo::clear_category(&tx, id)?;
    CategoryRepo::delete(&tx, id)?;
    tx.commit()?;

    log::info!("Removed category {} ({} template(s) detached)", category.code, detached);
    Ok(category)
}
