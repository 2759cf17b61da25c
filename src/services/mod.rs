//! Domain operations.
//!
//! Every operation takes a [`ServiceContext`](crate::context::ServiceContext)
//! and returns `anyhow::Result`. Request-scoped failures are raised as
//! [`SalesError`] so callers can tell them apart from storage faults.

pub mod boards;
pub mod categories;
pub mod content;
pub mod deals;
pub mod field_groups;
pub mod handlers;
pub mod pipelines;
pub mod references;
pub mod restore;
pub mod templates;

use anyhow::Result;
use crate::error::SalesError;

/// Reject blank values of required fields
pub(crate) fn require_non_empty(value: &str, field_name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SalesError::validation(format!("{} cannot be empty", field_name)).into());
    }
    Ok(())
}

/// Unwrap a required optional field
pub(crate) fn require<'a>(value: Option<&'a str>, field_name: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SalesError::validation(format!("{} is required", field_name)).into()),
    }
}
