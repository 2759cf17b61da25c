//! Field-group reference cleanup run before a board or pipeline is deleted.
//!
//! Groups are looked up by the entity id and rewritten one at a time. A
//! failure midway leaves the remaining groups untouched; running the cleanup
//! again only finds those, so removal can simply be retried.

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use crate::context::ServiceContext;
use crate::messenger::MessageRequest;
use crate::models::{FieldGroup, GroupRef};
use super::handlers::CORE_SERVICE;

/// Drop `id` from every field group referencing it; returns the number of
/// groups rewritten
pub fn detach_references(ctx: &ServiceContext, kind: GroupRef, id: &str) -> Result<usize> {
    let mut query = Map::new();
    query.insert(kind.field().to_string(), Value::String(id.to_string()));

    let found = ctx.send(
        MessageRequest::query(CORE_SERVICE, "fieldsGroups", "find")
            .with_input(json!({ "query": query }))
            .with_default(json!([])),
    )?;
    let groups: Vec<FieldGroup> = serde_json::from_value(found)
        .context("Unexpected result from fieldsGroups.find")?;

    let mut updated = 0;
    for mut group in groups {
        kind.detach(&mut group, id);
        ctx.send(
            MessageRequest::mutation(CORE_SERVICE, "fieldsGroups", "updateGroup")
                .with_input(json!({ "groupId": group.id, "fieldGroup": group })),
        )?;
        updated += 1;
    }

    if updated > 0 {
        log::info!("Detached {} {} from {} field group(s)", kind.field(), id, updated);
    }
    Ok(updated)
}
