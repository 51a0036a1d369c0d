// ── Auxiliary documents ──
//
// Room configurations and UI configs are owned by other services. fmdb only
// needs their ID and revision; every other field rides along untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named configuration a room can run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomConfiguration {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Touch-panel layout for one room, stored under the room's ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub api: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
