use serde::{Deserialize, Serialize};

/// Core-service record grouping custom fields, scoped to boards and pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub board_ids: Vec<String>,
    #[serde(default)]
    pub pipeline_ids: Vec<String>,
}

impl FieldGroup {
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            board_ids: Vec::new(),
            pipeline_ids: Vec::new(),
        }
    }
}

/// Which reference list of a field group an entity id lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRef {
    Board,
    Pipeline,
}

impl GroupRef {
    /// Wire name of the reference list
    pub fn field(&self) -> &'static str {
        match self {
            GroupRef::Board => "boardIds",
            GroupRef::Pipeline => "pipelineIds",
        }
    }

    pub fn ids<'a>(&self, group: &'a FieldGroup) -> &'a [String] {
        match self {
            GroupRef::Board => &group.board_ids,
            GroupRef::Pipeline => &group.pipeline_ids,
        }
    }

    /// Drop `id` from the matching reference list; returns whether anything changed
    pub fn detach(&self, group: &mut FieldGroup, id: &str) -> bool {
        let ids = match self {
            GroupRef::Board => &mut group.board_ids,
            GroupRef::Pipeline => &mut group.pipeline_ids,
        };
        let before = ids.len();
        ids.retain(|e| e != id);
        ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detach() {
        let mut group = FieldGroup::new("Deal fields".to_string());
        group.board_ids = vec!["b1".to_string(), "b2".to_string()];
        group.pipeline_ids = vec!["b1".to_string()];

        assert!(GroupRef::Board.detach(&mut group, "b1"));
        assert_eq!(group.board_ids, vec!["b2".to_string()]);
        // pipeline list untouched even though it shares the value
        assert_eq!(group.pipeline_ids, vec!["b1".to_string()]);
        assert!(!GroupRef::Board.detach(&mut group, "b1"));
    }
}
