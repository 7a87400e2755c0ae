//! Search query and response types.
//!
//! Queries are a small subset of the store's search DSL: a `bool.must`
//! term filter plus sorting and a size cap, which is all the boundary
//! lookups need.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sort direction for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize)]
struct SortSpec {
    order: SortOrder,
}

#[derive(Debug, Clone, Serialize)]
struct TermFilter {
    term: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize)]
struct BoolFilter {
    must: Vec<TermFilter>,
}

#[derive(Debug, Clone, Default, Serialize)]
struct Filter {
    bool: BoolFilter,
}

/// A search request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchQuery {
    filter: Filter,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sort: Vec<BTreeMap<String, SortSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

impl SearchQuery {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `bool.must` exact-match term clause.
    #[must_use]
    pub fn must_term(mut self, field: &str, value: &str) -> Self {
        let mut term = BTreeMap::new();
        term.insert(field.to_string(), value.to_string());
        self.filter.bool.must.push(TermFilter { term });
        self
    }

    /// Add a sort clause.
    #[must_use]
    pub fn sort_by(mut self, field: &str, order: SortOrder) -> Self {
        let mut clause = BTreeMap::new();
        clause.insert(field.to_string(), SortSpec { order });
        self.sort.push(clause);
        self
    }

    /// Cap the number of hits returned.
    #[must_use]
    pub const fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// The boundary query: single hit for `(namespace, repo, branch)`,
    /// sorted by commit time. `Desc` yields the newest indexed commit,
    /// `Asc` the oldest.
    #[must_use]
    pub fn boundary(namespace: &str, repo: &str, branch: &str, order: SortOrder) -> Self {
        Self::new()
            .must_term("namespace", namespace)
            .must_term("repo", repo)
            .must_term("branch", branch)
            .sort_by("commit_time", order)
            .size(1)
    }
}

/// Search response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    hits: Hits,
}

#[derive(Debug, Clone, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Clone, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
}

impl SearchResults {
    /// Document id of the first hit, if any.
    #[must_use]
    pub fn first_id(&self) -> Option<&str> {
        self.hits.hits.first().map(|hit| hit.id.as_str())
    }

    /// Number of hits returned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.hits.len()
    }

    /// Whether the search matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.hits.is_empty()
    }
}
