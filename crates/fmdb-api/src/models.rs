// Document store response types
//
// Shapes returned by the store for writes, errors, and `_find` queries.
// Document bodies themselves are generic: callers pick the type.

use serde::{Deserialize, Serialize};

/// Answer to a POST/PUT/DELETE of a single document.
///
/// ```json
/// { "ok": true, "id": "BLDG", "rev": "1-967a00dff5e02add41819138abb3284d" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertResponse {
    #[serde(default)]
    pub ok: bool,
    pub id: String,
    pub rev: String,
}

/// Error payload carried by every non-2xx store response.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreErrorBody {
    pub error: String,
    #[serde(default)]
    pub reason: String,
}

/// Result envelope of `POST <collection>/_find`.
#[derive(Debug, Deserialize)]
pub struct FindResponse<T> {
    pub docs: Vec<T>,
    /// Set by the store when no index backs the selector.
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub bookmark: Option<String>,
}
