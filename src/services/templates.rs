//! Template store operations and cross-service restore.

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use crate::context::{RestorePolicy, ServiceContext};
use crate::error::SalesError;
use crate::messenger::MessageRequest;
use crate::models::{ContentTag, Template, TemplateDoc, TemplateStatus};
use crate::repo::{CategoryRepo, TemplateQuery, TemplateRepo};
use super::content::SaveAsTemplate;
use super::require;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 20;

/// Listing filters; all optional
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    /// Case-insensitive substring of name or description
    pub search_value: Option<String>,
    pub category_ids: Vec<String>,
    pub content_type: Option<String>,
    /// Exact status; `None` hides inactive templates
    pub status: Option<TemplateStatus>,
}

/// Offset paging, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: usize,
    pub per_page: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, per_page: DEFAULT_PER_PAGE }
    }
}

impl Paging {
    pub fn new(page: Option<usize>, per_page: Option<usize>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            per_page: per_page.filter(|p| *p > 0).unwrap_or(DEFAULT_PER_PAGE),
        }
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePage {
    pub list: Vec<Template>,
    pub total_count: usize,
    pub page_info: PageInfo,
}

/// Raw template returned when content cannot be restored
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTemplate {
    pub id: String,
    pub name: String,
    pub content: String,
    pub content_type: Option<String>,
}

impl From<&Template> for RawTemplate {
    fn from(template: &Template) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            content: template.content.clone(),
            content_type: template.content_type.clone(),
        }
    }
}

/// Outcome of [`use_template`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateUse {
    /// Result of the owning service
    Restored(Value),
    Raw(RawTemplate),
}

pub fn get(ctx: &ServiceContext, id: &str) -> Result<Template> {
    TemplateRepo::get_by_id(ctx.conn, id)?
        .ok_or_else(|| SalesError::not_found("Template", id).into())
}

fn validate_doc(ctx: &ServiceContext, doc: &TemplateDoc) -> Result<()> {
    if let Some(ref content_type) = doc.content_type {
        if !ContentTag::is_valid_stored(content_type) {
            return Err(SalesError::validation(format!(
                "Invalid content type '{}'. Expected format \"service:resource\"",
                content_type
            ))
            .into());
        }
    }
    if let Some(category) = doc.category.as_deref().filter(|c| !c.trim().is_empty()) {
        if CategoryRepo::get_by_id(ctx.conn, category)?.is_none() {
            return Err(SalesError::not_found("Category", category).into());
        }
    }
    Ok(())
}

pub fn add(ctx: &ServiceContext, doc: &TemplateDoc) -> Result<Template> {
    let name = require(doc.name.as_deref(), "Template name")?;
    let content = require(doc.content.as_deref(), "Template content")?;
    validate_doc(ctx, doc)?;

    let mut template = Template::new(name.to_string(), content.to_string());
    template.apply(doc);
    template.created_by = ctx.user_owned();
    TemplateRepo::create(ctx.conn, &template)?;

    log::info!("Created template {} ({})", template.id, template.name);
    Ok(template)
}

pub fn edit(ctx: &ServiceContext, id: &str, doc: &TemplateDoc) -> Result<Template> {
    let mut template = get(ctx, id)?;
    if doc.name.is_some() {
        require(doc.name.as_deref(), "Template name")?;
    }
    if doc.content.is_some() {
        require(doc.content.as_deref(), "Template content")?;
    }
    validate_doc(ctx, doc)?;

    template.apply(doc);
    template.updated_by = ctx.user_owned();
    template.modified_ts = chrono::Utc::now().timestamp();
    TemplateRepo::update(ctx.conn, &template)?;

    log::info!("Updated template {}", id);
    Ok(template)
}

/// Delete a template, returning the removed record
pub fn remove(ctx: &ServiceContext, id: &str) -> Result<Template> {
    let template = get(ctx, id)?;
    TemplateRepo::delete(ctx.conn, id)?;
    log::info!("Removed template {} ({})", id, template.name);
    Ok(template)
}

pub fn list(ctx: &ServiceContext, filter: &TemplateFilter, paging: Paging) -> Result<TemplatePage> {
    let query = TemplateQuery {
        status: filter.status,
        category_ids: filter.category_ids.clone(),
        content_type: filter.content_type.clone(),
    };
    let mut matches = TemplateRepo::list(ctx.conn, &query)?;

    if let Some(ref search) = filter.search_value {
        let needle = search.to_lowercase();
        if !needle.is_empty() {
            matches.retain(|t| {
                t.name.to_lowercase().contains(&needle)
                    || t.description
                        .as_deref()
                        .map_or(false, |d| d.to_lowercase().contains(&needle))
            });
        }
    }

    let total_count = matches.len();
    let offset = paging.offset();
    let list: Vec<Template> = matches.into_iter().skip(offset).take(paging.per_page).collect();

    Ok(TemplatePage {
        page_info: PageInfo {
            has_next_page: offset.saturating_add(list.len()) < total_count,
            has_previous_page: paging.page > 1,
        },
        list,
        total_count,
    })
}

/// Distinct content types in use
pub fn types(ctx: &ServiceContext) -> Result<Vec<String>> {
    TemplateRepo::distinct_content_types(ctx.conn)
}

fn fall_back(ctx: &ServiceContext, template: &Template, reason: anyhow::Error) -> Result<TemplateUse> {
    match ctx.policy {
        RestorePolicy::Strict => Err(reason),
        RestorePolicy::Fallback => {
            log::warn!("Returning raw template {}: {:#}", template.id, reason);
            Ok(TemplateUse::Raw(RawTemplate::from(template)))
        }
    }
}

/// Restore a template through the service named by its content type.
///
/// `board_id` is forwarded for resources that need a parent board.
pub fn use_template(ctx: &ServiceContext, id: &str, board_id: Option<&str>) -> Result<TemplateUse> {
    let template = get(ctx, id)?;

    let tag = match template.content_tag() {
        Some(tag) => tag,
        None => {
            let reason = SalesError::validation(format!(
                "Template '{}' has no usable content type ({}). Expected format \"service:resource\"",
                id,
                template.content_type.as_deref().unwrap_or("none")
            ));
            return fall_back(ctx, &template, reason.into());
        }
    };

    let mut input = json!({
        "template": template,
        "resourceType": tag.resource,
        "currentUser": ctx.user,
    });
    if let Some(board_id) = board_id {
        input["boardId"] = json!(board_id);
    }

    let request = MessageRequest::mutation(&tag.service, "templates", "useTemplate").with_input(input);
    match ctx.send(request) {
        Ok(result) if !result.is_null() => {
            log::info!("Restored template {} through {}", id, tag);
            Ok(TemplateUse::Restored(result))
        }
        Ok(_) => {
            let reason = anyhow::Error::msg(format!("{} returned no result", tag)).context(
                SalesError::Downstream {
                    service: tag.service.clone(),
                    module: "templates".to_string(),
                    action: "useTemplate".to_string(),
                },
            );
            fall_back(ctx, &template, reason)
        }
        Err(e) => fall_back(ctx, &template, e),
    }
}

/// Ask the owning service to export `source_id` as a template
pub fn save_from(
    ctx: &ServiceContext,
    source_id: &str,
    content_type: &str,
    request: &SaveAsTemplate,
) -> Result<Value> {
    let tag = ContentTag::parse(content_type).ok_or_else(|| {
        SalesError::validation(format!(
            "Invalid content type '{}'. Expected format \"service:resource\"",
            content_type
        ))
    })?;

    ctx.send(
        MessageRequest::mutation(&tag.service, "templates", "saveAsTemplate").with_input(json!({
            "sourceId": source_id,
            "resourceType": tag.resource,
            "name": request.name,
            "description": request.description,
            "status": request.status,
            "currentUser": ctx.user,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;
    use crate::error::classify;

    fn doc(name: &str, content_type: Option<&str>) -> TemplateDoc {
        TemplateDoc {
            name: Some(name.to_string()),
            content: Some("{}".to_string()),
            content_type: content_type.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_validates() {
        let app = AppContext::in_memory().unwrap().with_user(Some("u1".to_string()));
        let ctx = app.service();

        let created = add(&ctx, &doc("Standard", Some("sales:board"))).unwrap();
        assert_eq!(created.created_by.as_deref(), Some("u1"));
        assert_eq!(created.status, TemplateStatus::Active);

        let err = add(&ctx, &doc("Bad", Some("sales-board"))).unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::Validation(_))));

        let err = add(&ctx, &TemplateDoc { name: Some("x".to_string()), ..Default::default() }).unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::Validation(_))));

        let mut missing_category = doc("Cat", None);
        missing_category.category = Some("nope".to_string());
        let err = add(&ctx, &missing_category).unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::NotFound { kind: "Category", .. })));
    }

    #[test]
    fn test_edit_and_remove() {
        let app = AppContext::in_memory().unwrap().with_user(Some("u2".to_string()));
        let ctx = app.service();
        let created = add(&ctx, &doc("Standard", None)).unwrap();

        let edited = edit(&ctx, &created.id, &TemplateDoc {
            description: Some("Updated".to_string()),
            status: Some(TemplateStatus::Inactive),
            ..Default::default()
        }).unwrap();
        assert_eq!(edited.name, "Standard");
        assert_eq!(edited.description.as_deref(), Some("Updated"));
        assert_eq!(edited.updated_by.as_deref(), Some("u2"));

        let removed = remove(&ctx, &created.id).unwrap();
        assert_eq!(removed.id, created.id);
        let err = get(&ctx, &created.id).unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::NotFound { .. })));
    }

    #[test]
    fn test_edit_clears_category_and_description() {
        use crate::models::CategoryDoc;
        use crate::services::categories;

        let app = AppContext::in_memory().unwrap();
        let ctx = app.service();
        let category = categories::add(&ctx, &CategoryDoc {
            name: Some("Sales".to_string()),
            code: Some("sales".to_string()),
            content_type: Some("sales:board".to_string()),
            ..Default::default()
        }).unwrap();

        let mut with_category = doc("Standard", None);
        with_category.category = Some(category.id.clone());
        with_category.description = Some("Ours".to_string());
        let created = add(&ctx, &with_category).unwrap();
        assert_eq!(created.category.as_deref(), Some(category.id.as_str()));

        let cleared = edit(&ctx, &created.id, &TemplateDoc {
            category: Some(String::new()),
            description: Some(String::new()),
            ..Default::default()
        }).unwrap();
        assert_eq!(cleared.category, None);
        assert_eq!(cleared.description, None);
        let stored = get(&ctx, &created.id).unwrap();
        assert_eq!(stored.category, None);
        assert_eq!(stored.description, None);
    }

    #[test]
    fn test_list_paging() {
        let app = AppContext::in_memory().unwrap();
        let ctx = app.service();
        for i in 0..5 {
            add(&ctx, &doc(&format!("T{}", i), None)).unwrap();
        }

        let first = list(&ctx, &TemplateFilter::default(), Paging::new(Some(1), Some(2))).unwrap();
        assert_eq!(first.total_count, 5);
        assert_eq!(first.list.len(), 2);
        assert_eq!(first.page_info, PageInfo { has_next_page: true, has_previous_page: false });
        // newest first
        assert_eq!(first.list[0].name, "T4");

        let last = list(&ctx, &TemplateFilter::default(), Paging::new(Some(3), Some(2))).unwrap();
        assert_eq!(last.list.len(), 1);
        assert_eq!(last.list[0].name, "T0");
        assert_eq!(last.page_info, PageInfo { has_next_page: false, has_previous_page: true });

        let beyond = list(&ctx, &TemplateFilter::default(), Paging::new(Some(9), Some(2))).unwrap();
        assert!(beyond.list.is_empty());
        assert_eq!(beyond.total_count, 5);
    }

    #[test]
    fn test_paging_defaults() {
        assert_eq!(Paging::new(None, None), Paging { page: 1, per_page: 20 });
        assert_eq!(Paging::new(Some(0), Some(0)), Paging::default());
    }

    #[test]
    fn test_list_filters() {
        let app = AppContext::in_memory().unwrap();
        let ctx = app.service();
        add(&ctx, &doc("Board A", Some("sales:board"))).unwrap();
        add(&ctx, &doc("Pipe A", Some("sales:pipeline"))).unwrap();

        let filter = TemplateFilter {
            content_type: Some("sales:pipeline".to_string()),
            ..Default::default()
        };
        let page = list(&ctx, &filter, Paging::default()).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.list[0].name, "Pipe A");

        assert_eq!(types(&ctx).unwrap(), vec!["sales:board".to_string(), "sales:pipeline".to_string()]);
    }

    #[test]
    fn test_use_template_unknown_service() {
        let app = AppContext::in_memory().unwrap();
        let ctx = app.service();
        let created = add(&ctx, &doc("Widget", Some("inventory:widget"))).unwrap();

        match use_template(&ctx, &created.id, None).unwrap() {
            TemplateUse::Raw(raw) => assert_eq!(raw, RawTemplate::from(&created)),
            other => panic!("expected raw template, got {:?}", other),
        }

        let strict = AppContext::in_memory().unwrap().with_policy(RestorePolicy::Strict);
        let sctx = strict.service();
        let created = add(&sctx, &doc("Widget", Some("inventory:widget"))).unwrap();
        let err = use_template(&sctx, &created.id, None).unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::Downstream { .. })));
    }

    #[test]
    fn test_save_from_rejects_bad_type() {
        let app = AppContext::in_memory().unwrap();
        let err = save_from(&app.service(), "x", "sales", &SaveAsTemplate::default()).unwrap_err();
        assert!(matches!(classify(&err), Some(SalesError::Validation(_))));
    }
}
