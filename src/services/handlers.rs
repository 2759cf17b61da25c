//! In-process service endpoints reachable through the messenger.
//!
//! | service    | method   | route                         |
//! |------------|----------|-------------------------------|
//! | `template` | mutation | `templates.add`               |
//! | `sales`    | mutation | `templates.useTemplate`       |
//! | `sales`    | mutation | `templates.saveAsTemplate`    |
//! | `core`     | query    | `fieldsGroups.find`           |
//! | `core`     | mutation | `fieldsGroups.updateGroup`    |

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::rc::Rc;
use crate::context::{RestorePolicy, ServiceContext};
use crate::error::SalesError;
use crate::messenger::{unknown_action, LocalMessenger, MessageRequest, Messenger, Method, ServiceHandler};
use crate::models::{FieldGroup, GroupRef, Template, TemplateDoc, TemplateStatus};
use crate::repo::FieldGroupRepo;
use super::content::SaveAsTemplate;
use super::{boards, pipelines, restore, templates};

pub const TEMPLATE_SERVICE: &str = "template";
pub const SALES_SERVICE: &str = "sales";
pub const CORE_SERVICE: &str = "core";

/// Messenger with the template, sales and core services registered
pub fn local_messenger(conn: Rc<Connection>) -> LocalMessenger {
    let mut messenger = LocalMessenger::new();
    messenger.register(TEMPLATE_SERVICE, Box::new(TemplateService { conn: Rc::clone(&conn) }));
    messenger.register(SALES_SERVICE, Box::new(SalesService { conn: Rc::clone(&conn) }));
    messenger.register(CORE_SERVICE, Box::new(CoreService { conn }));
    messenger
}

/// Context for work done on behalf of a request: the caller's user and scope
fn scoped<'a>(
    conn: &'a Connection,
    messenger: &'a dyn Messenger,
    request: &'a MessageRequest,
) -> ServiceContext<'a> {
    ServiceContext {
        conn,
        messenger,
        user: request.input.get("currentUser").and_then(Value::as_str),
        subdomain: &request.subdomain,
        policy: RestorePolicy::Fallback,
    }
}

fn field<T: DeserializeOwned>(request: &MessageRequest, key: &str) -> Result<T> {
    let value = request.input.get(key).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).with_context(|| {
        SalesError::validation(format!("Invalid or missing '{}' in {} input", key, request.route()))
    })
}

fn required_str<'a>(request: &'a MessageRequest, key: &str) -> Result<&'a str> {
    request
        .input
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            SalesError::validation(format!("Missing '{}' in {} input", key, request.route())).into()
        })
}

struct TemplateService {
    conn: Rc<Connection>,
}

impl ServiceHandler for TemplateService {
    fn handle(&self, request: &MessageRequest, messenger: &dyn Messenger) -> Result<Value> {
        let ctx = scoped(&self.conn, messenger, request);
        match (request.method, request.module.as_str(), request.action.as_str()) {
            (Method::Mutation, "templates", "add") => {
                let doc: TemplateDoc = field(request, "doc")?;
                Ok(serde_json::to_value(templates::add(&ctx, &doc)?)?)
            }
            _ => Err(unknown_action(request)),
        }
    }
}

struct SalesService {
    conn: Rc<Connection>,
}

impl ServiceHandler for SalesService {
    fn handle(&self, request: &MessageRequest, messenger: &dyn Messenger) -> Result<Value> {
        let ctx = scoped(&self.conn, messenger, request);
        match (request.method, request.module.as_str(), request.action.as_str()) {
            (Method::Mutation, "templates", "useTemplate") => {
                let template: Template = field(request, "template")?;
                let resource = required_str(request, "resourceType")?;
                let board_id = request.input.get("boardId").and_then(Value::as_str);
                restore::restore(&ctx, &template, resource, board_id)
            }
            (Method::Mutation, "templates", "saveAsTemplate") => {
                let source_id = required_str(request, "sourceId")?;
                let save = SaveAsTemplate {
                    name: required_str(request, "name")?.to_string(),
                    description: field(request, "description")?,
                    status: field::<Option<TemplateStatus>>(request, "status")?,
                };
                let saved = match required_str(request, "resourceType")? {
                    "board" => boards::save_as_template(&ctx, source_id, &save)?,
                    "pipeline" => pipelines::save_as_template(&ctx, source_id, &save)?,
                    other => {
                        return Err(SalesError::validation(format!(
                            "Unsupported sales resource '{}'",
                            other
                        ))
                        .into())
                    }
                };
                Ok(serde_json::to_value(saved)?)
            }
            _ => Err(unknown_action(request)),
        }
    }
}

struct CoreService {
    conn: Rc<Connection>,
}

impl ServiceHandler for CoreService {
    fn handle(&self, request: &MessageRequest, _messenger: &dyn Messenger) -> Result<Value> {
        match (request.method, request.module.as_str(), request.action.as_str()) {
            (Method::Query, "fieldsGroups", "find") => {
                let query = request.input.get("query").cloned().unwrap_or(Value::Null);
                let (kind, id) = if let Some(id) = query.get(GroupRef::Board.field()).and_then(Value::as_str) {
                    (GroupRef::Board, id)
                } else if let Some(id) = query.get(GroupRef::Pipeline.field()).and_then(Value::as_str) {
                    (GroupRef::Pipeline, id)
                } else {
                    return Err(SalesError::validation("fieldsGroups.find needs boardIds or pipelineIds").into());
                };
                let groups = FieldGroupRepo::find_referencing(&self.conn, kind, id)?;
                Ok(serde_json::to_value(groups)?)
            }
            (Method::Mutation, "fieldsGroups", "updateGroup") => {
                let group_id = required_str(request, "groupId")?;
                let mut group: FieldGroup = field(request, "fieldGroup")?;
                if FieldGroupRepo::get_by_id(&self.conn, group_id)?.is_none() {
                    return Err(SalesError::not_found("Field group", group_id).into());
                }
                group.id = group_id.to_string();
                FieldGroupRepo::update(&self.conn, &group)?;
                Ok(serde_json::to_value(group)?)
            }
            _ => Err(unknown_action(request)),
        }
    }
}
