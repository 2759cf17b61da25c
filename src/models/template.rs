use serde::{Deserialize, Serialize};
use std::fmt;

/// Template and category status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    Active,
    Inactive,
}

impl TemplateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::Active => "active",
            TemplateStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TemplateStatus::Active),
            "inactive" => Some(TemplateStatus::Inactive),
            _ => None,
        }
    }
}

/// Routing key of a template: `<service>:<resource>`
///
/// Only the first colon separates the two parts, so `a:b:c` names service
/// `a` and resource `b:c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTag {
    pub service: String,
    pub resource: String,
}

impl ContentTag {
    pub fn new(service: &str, resource: &str) -> Self {
        Self {
            service: service.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Parse a tag; `None` when the colon is missing or either side is empty
    pub fn parse(tag: &str) -> Option<Self> {
        let (service, resource) = tag.split_once(':')?;
        if service.is_empty() || resource.is_empty() {
            return None;
        }
        Some(Self::new(service, resource))
    }

    /// Stored tags may be empty; anything else must parse
    pub fn is_valid_stored(tag: &str) -> bool {
        tag.is_empty() || Self::parse(tag).is_some()
    }
}

impl fmt::Display for ContentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.resource)
    }
}

/// A named, serialized snapshot of an entity's structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub content: String,
    pub content_type: Option<String>,
    pub plugin_type: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: TemplateStatus,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Template {
    pub fn new(name: String, content: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            content,
            content_type: None,
            plugin_type: None,
            description: None,
            category: None,
            status: TemplateStatus::Active,
            created_by: None,
            updated_by: None,
            created_ts: now,
            modified_ts: now,
        }
    }

    pub fn content_tag(&self) -> Option<ContentTag> {
        self.content_type.as_deref().and_then(ContentTag::parse)
    }

    /// Overwrite every field the doc carries
    pub fn apply(&mut self, doc: &TemplateDoc) {
        if let Some(ref name) = doc.name {
            self.name = name.clone();
        }
        if let Some(ref content) = doc.content {
            self.content = content.clone();
        }
        if doc.content_type.is_some() {
            self.content_type = doc.content_type.clone();
        }
        if doc.plugin_type.is_some() {
            self.plugin_type = doc.plugin_type.clone();
        }
        // An empty description or category clears it
        if let Some(ref description) = doc.description {
            self.description = non_empty(description);
        }
        if let Some(ref category) = doc.category {
            self.category = non_empty(category);
        }
        if let Some(status) = doc.status {
            self.status = status;
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Template fields supplied by add/edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDoc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub plugin_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<TemplateStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_tag_parse() {
        assert_eq!(ContentTag::parse("sales:board"), Some(ContentTag::new("sales", "board")));
        assert_eq!(
            ContentTag::parse("inventory:widget:extra"),
            Some(ContentTag::new("inventory", "widget:extra"))
        );
        assert_eq!(ContentTag::parse("sales-board"), None);
        assert_eq!(ContentTag::parse(":board"), None);
        assert_eq!(ContentTag::parse("sales:"), None);
        assert_eq!(ContentTag::parse(""), None);
    }

    #[test]
    fn test_stored_tag_validity() {
        assert!(ContentTag::is_valid_stored(""));
        assert!(ContentTag::is_valid_stored("sales:pipeline"));
        assert!(!ContentTag::is_valid_stored("sales"));
        assert!(!ContentTag::is_valid_stored("sales:"));
    }

    #[test]
    fn test_content_tag_display() {
        assert_eq!(ContentTag::new("sales", "board").to_string(), "sales:board");
    }

    #[test]
    fn test_template_status_conversion() {
        assert_eq!(TemplateStatus::from_str("active"), Some(TemplateStatus::Active));
        assert_eq!(TemplateStatus::from_str("inactive"), Some(TemplateStatus::Inactive));
        assert_eq!(TemplateStatus::from_str("archived"), None);
    }

    #[test]
    fn test_doc_deserializes_camel_case() {
        let doc: TemplateDoc = serde_json::from_value(serde_json::json!({
            "name": "Standard",
            "content": "{}",
            "contentType": "sales:board",
            "pluginType": "sales",
            "status": "inactive"
        }))
        .unwrap();
        assert_eq!(doc.content_type.as_deref(), Some("sales:board"));
        assert_eq!(doc.status, Some(TemplateStatus::Inactive));
        assert!(doc.category.is_none());
    }

    #[test]
    fn test_apply_clears_with_empty_values() {
        let mut template = Template::new("Std".to_string(), "{}".to_string());
        template.description = Some("Old".to_string());
        template.category = Some("c1".to_string());

        template.apply(&TemplateDoc {
            description: Some(String::new()),
            category: Some(" ".to_string()),
            ..Default::default()
        });
        assert_eq!(template.description, None);
        assert_eq!(template.category, None);
        assert_eq!(template.name, "Std");
    }
}
