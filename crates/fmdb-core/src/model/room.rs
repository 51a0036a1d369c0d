use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identifier::{IdError, IdSchema, RoomId};
use crate::model::{DocumentRef, EntityKind};

/// A room. The owning building is encoded in the ID, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub designation: String,
    /// The room configuration this room runs, by reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<DocumentRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Room {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// The building this room belongs to, derived from its ID.
    pub fn building_id(&self, schema: &IdSchema) -> Result<String, IdError> {
        schema.building_id_of(&self.id)
    }

    pub fn validate(&self, schema: &IdSchema) -> Result<RoomId, CoreError> {
        let id = schema.parse_room(&self.id)?;
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid(
                EntityKind::Room,
                format!("{} has no name", self.id),
            ));
        }
        if let Some(config) = &self.configuration {
            if config.id.is_empty() {
                return Err(CoreError::invalid(
                    EntityKind::Room,
                    format!("{} references a configuration with an empty ID", self.id),
                ));
            }
        }
        Ok(id)
    }
}
