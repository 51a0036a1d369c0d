// ── Prefix query engine ──
//
// "All children of X" becomes an `_id` range query: every ID strictly
// between `X-` and `X.` starts with `X-`. Results come back in the store's
// key order. Listings return one page, and a page that comes back exactly
// full is flagged as possibly truncated. Cascades page through every child.

use tracing::{debug, warn};

use fmdb_api::FindQuery;

use crate::error::{CoreError, Operation};
use crate::facility::Facility;
use crate::identifier::IdSchema;
use crate::model::Document;

/// What a range query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Every document whose ID starts with `prefix` + delimiter.
    ChildrenOf(&'a str),
    /// The whole collection.
    Everything,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    pub docs: Vec<T>,
    /// The page hit the limit; more matching documents may exist.
    pub possibly_truncated: bool,
}

impl<T> QueryResult<T> {
    /// Keep only matching documents; the truncation flag carries over.
    pub fn filter(self, mut keep: impl FnMut(&T) -> bool) -> Self {
        Self {
            docs: self.docs.into_iter().filter(|d| keep(d)).collect(),
            possibly_truncated: self.possibly_truncated,
        }
    }

    pub fn ids(&self) -> Vec<&str>
    where
        T: Document,
    {
        self.docs.iter().map(|d| d.id()).collect()
    }
}

/// Build the `_find` body for `scope`. An empty prefix means everything.
pub fn build_query(schema: &IdSchema, scope: Scope<'_>, limit: usize) -> FindQuery {
    match scope {
        Scope::ChildrenOf(prefix) if !prefix.is_empty() => {
            let (gt, lt) = schema.child_bounds(prefix);
            FindQuery::range(gt, lt, limit)
        }
        _ => FindQuery::all(limit),
    }
}

impl Facility {
    /// Run a range query over the collection for `T`.
    pub async fn query<T: Document>(
        &self,
        scope: Scope<'_>,
        limit: usize,
    ) -> Result<QueryResult<T>, CoreError> {
        let query = build_query(self.schema(), scope, limit);
        let subject = match scope {
            Scope::ChildrenOf(prefix) => prefix,
            Scope::Everything => "*",
        };

        let docs = self.find_page::<T>(&query, subject).await?;

        let possibly_truncated = docs.len() >= limit;
        if possibly_truncated {
            warn!(
                collection = T::KIND.collection(),
                scope = subject,
                limit,
                "query returned a full page; results may be truncated"
            );
        }

        Ok(QueryResult {
            docs,
            possibly_truncated,
        })
    }

    /// Every child of `prefix`, however many pages that takes. A full page
    /// is followed by another starting after its last ID, until one comes
    /// back short.
    pub async fn all_children_of<T: Document>(&self, prefix: &str) -> Result<Vec<T>, CoreError> {
        let limit = self.config().find_limit.max(1);
        let (mut after, below) = self.schema().child_bounds(prefix);
        let mut docs = Vec::new();

        loop {
            let query = FindQuery::range(after.clone(), below.clone(), limit);
            let page = self.find_page::<T>(&query, prefix).await?;
            let next = match page.last() {
                Some(last) if page.len() >= limit && last.id() > after.as_str() => {
                    Some(last.id().to_owned())
                }
                _ => None,
            };
            docs.extend(page);

            match next {
                Some(last) => {
                    debug!(collection = T::KIND.collection(), prefix, after = %last, "fetching next page");
                    after = last;
                }
                None => return Ok(docs),
            }
        }
    }

    async fn find_page<T: Document>(&self, query: &FindQuery, subject: &str) -> Result<Vec<T>, CoreError> {
        let resp = self
            .client()
            .find::<T>(T::KIND.collection(), query)
            .await
            .map_err(|e| CoreError::store(e, T::KIND, subject, Operation::Query))?;

        if let Some(warning) = &resp.warning {
            debug!(collection = T::KIND.collection(), %warning, "store query warning");
        }
        Ok(resp.docs)
    }

    /// Children of `prefix` with the scoped query limit.
    pub async fn children_of<T: Document>(&self, prefix: &str) -> Result<QueryResult<T>, CoreError> {
        self.query(Scope::ChildrenOf(prefix), self.config().find_limit)
            .await
    }

    /// The whole collection with the scoped query limit.
    pub async fn all_of<T: Document>(&self) -> Result<QueryResult<T>, CoreError> {
        self.query(Scope::Everything, self.config().find_limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn children_query_bounds_the_prefix() {
        let query = build_query(&IdSchema::default(), Scope::ChildrenOf("BLDG-101"), 1000);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "selector": { "_id": { "$gt": "BLDG-101-", "$lt": "BLDG-101." } },
                "limit": 1000
            })
        );
    }

    #[test]
    fn empty_prefix_lists_everything() {
        let schema = IdSchema::default();
        assert_eq!(
            build_query(&schema, Scope::ChildrenOf(""), 5000),
            FindQuery::all(5000)
        );
        assert_eq!(build_query(&schema, Scope::Everything, 10), FindQuery::all(10));
    }
}
