use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identifier::{BuildingId, IdSchema};
use crate::model::EntityKind;

/// Top of the hierarchy. Its ID never contains the delimiter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Building {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self, schema: &IdSchema) -> Result<BuildingId, CoreError> {
        if self.id.is_empty() {
            return Err(CoreError::invalid(EntityKind::Building, "missing ID"));
        }
        let id = schema.parse_building(&self.id)?;
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid(
                EntityKind::Building,
                format!("{} has no name", self.id),
            ));
        }
        Ok(id)
    }
}
