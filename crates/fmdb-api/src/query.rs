// `_find` selector wire types
//
// Only the ID-range selector is modelled: every hierarchy query in fmdb is a
// range over `_id`, bounded below by `$gt` and optionally above by `$lt`.

use serde::Serialize;

/// The lowest possible key. `$gt` against it matches every document.
pub const LOWEST_KEY: &str = "\u{0}";

/// Body of a `POST <collection>/_find` request.
///
/// ```json
/// { "selector": { "_id": { "$gt": "BLDG-101-", "$lt": "BLDG-101." } }, "limit": 1000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindQuery {
    pub selector: Selector,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selector {
    #[serde(rename = "_id")]
    pub id: IdRange,
}

/// Exclusive bounds on the document ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRange {
    #[serde(rename = "$gt", skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    #[serde(rename = "$lt", skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
}

impl FindQuery {
    /// Select IDs strictly between `gt` and `lt`.
    pub fn range(gt: impl Into<String>, lt: impl Into<String>, limit: usize) -> Self {
        Self {
            selector: Selector {
                id: IdRange {
                    gt: Some(gt.into()),
                    lt: Some(lt.into()),
                },
            },
            limit,
        }
    }

    /// Select every document in the collection, up to `limit`.
    pub fn all(limit: usize) -> Self {
        Self {
            selector: Selector {
                id: IdRange {
                    gt: Some(LOWEST_KEY.to_owned()),
                    lt: None,
                },
            },
            limit,
        }
    }
}
