//! Commit store: binds an [`IndexClient`] to an index/type scope and
//! provides the operations the sync engine needs.

use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::client::IndexClient;
use crate::error::Result;
use crate::search::{SearchQuery, SortOrder};
use crate::traits::CommitIndex;
use crate::types::CommitDoc;

/// Identifier-like fields that must not be tokenized by the store,
/// otherwise exact-match boundary filters silently miss.
const EXACT_MATCH_FIELDS: [&str; 5] = ["namespace", "repo", "branch", "sha", "repo_url"];

/// Date fields accepting both strict ISO timestamps and epoch millis.
const DATE_FIELDS: [&str; 1] = ["commit_time"];

/// Store for commit documents within one index/type scope.
pub struct CommitStore {
    client: IndexClient,
    index: String,
    doc_type: String,
}

impl CommitStore {
    /// Default index name.
    pub const DEFAULT_INDEX: &'static str = "git";
    /// Default document type.
    pub const DEFAULT_DOC_TYPE: &'static str = "commit";

    /// Create a store using the default `git`/`commit` scope.
    #[must_use]
    pub fn new(client: IndexClient) -> Self {
        Self::with_scope(client, Self::DEFAULT_INDEX, Self::DEFAULT_DOC_TYPE)
    }

    /// Create a store with a custom index/type scope.
    #[must_use]
    pub fn with_scope(
        client: IndexClient,
        index: impl Into<String>,
        doc_type: impl Into<String>,
    ) -> Self {
        Self {
            client,
            index: index.into(),
            doc_type: doc_type.into(),
        }
    }

    /// Ensure the index and its field mappings exist.
    ///
    /// Safe to call on every process start: only writes when the index
    /// or a required field mapping is missing.
    ///
    /// # Errors
    /// Returns error if the store rejects a read or write.
    pub async fn ensure_schema(&self) -> Result<()> {
        if self.client.get_index(&self.index).await?.is_none() {
            info!(index = %self.index, "creating missing index");
            self.client.create_index(&self.index, &json!({})).await?;
        }

        let mapping = self.client.get_mapping(&self.index, &self.doc_type).await?;
        let mut properties = mapping
            .as_ref()
            .and_then(|m| {
                m.pointer(&format!(
                    "/{}/mappings/{}/properties",
                    self.index, self.doc_type
                ))
            })
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Map::new);

        if !add_missing_fields(&mut properties) {
            debug!(index = %self.index, "mapping already satisfies schema");
            return Ok(());
        }

        info!(index = %self.index, doc_type = %self.doc_type, "updating field mappings");
        self.client
            .update_mapping(
                &self.index,
                &self.doc_type,
                &json!({ "properties": properties }),
            )
            .await?;
        Ok(())
    }

    async fn boundary_sha(
        &self,
        namespace: &str,
        repo: &str,
        branch: &str,
        order: SortOrder,
    ) -> Result<Option<String>> {
        let query = SearchQuery::boundary(namespace, repo, branch, order);
        let results = self.client.search(&self.index, &self.doc_type, &query).await?;
        Ok(results.first_id().map(String::from))
    }

    /// SHA of the newest indexed commit for the scope, if any.
    ///
    /// # Errors
    /// Returns error if the search fails.
    pub async fn newest_sha(
        &self,
        namespace: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<String>> {
        self.boundary_sha(namespace, repo, branch, SortOrder::Desc)
            .await
    }

    /// SHA of the oldest indexed commit for the scope, if any.
    ///
    /// # Errors
    /// Returns error if the search fails.
    pub async fn oldest_sha(
        &self,
        namespace: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<String>> {
        self.boundary_sha(namespace, repo, branch, SortOrder::Asc)
            .await
    }

    /// Upsert one commit document, keyed by its SHA.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub async fn publish(&self, doc: &CommitDoc) -> Result<()> {
        debug!(sha = %doc.sha, repo = %doc.repo, "publishing commit document");
        self.client
            .put_document(&self.index, &self.doc_type, &doc.sha, doc)
            .await?;
        Ok(())
    }
}

/// Insert mapping specs for required fields that are absent.
/// Returns whether anything was added.
fn add_missing_fields(properties: &mut Map<String, Value>) -> bool {
    let mut changed = false;

    for field in EXACT_MATCH_FIELDS {
        if !properties.contains_key(field) {
            properties.insert(
                field.to_string(),
                json!({ "type": "string", "index": "not_analyzed" }),
            );
            changed = true;
        }
    }
    for field in DATE_FIELDS {
        if !properties.contains_key(field) {
            properties.insert(
                field.to_string(),
                json!({
                    "type": "date",
                    "format": "strict_date_optional_time||epoch_millis",
                }),
            );
            changed = true;
        }
    }

    changed
}

impl CommitIndex for CommitStore {
    async fn ensure_schema(&self) -> Result<()> {
        self.ensure_schema().await
    }

    async fn newest_sha(&self, namespace: &str, repo: &str, branch: &str) -> Result<Option<String>> {
        self.newest_sha(namespace, repo, branch).await
    }

    async fn oldest_sha(&self, namespace: &str, repo: &str, branch: &str) -> Result<Option<String>> {
        self.oldest_sha(namespace, repo, branch).await
    }

    async fn publish(&self, doc: &CommitDoc) -> Result<()> {
        self.publish(doc).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(base_url: &str) -> CommitStore {
        CommitStore::new(IndexClient::new(base_url).unwrap())
    }

    fn full_mapping() -> serde_json::Value {
        let mut properties = Map::new();
        add_missing_fields(&mut properties);
        json!({ "git": { "mappings": { "commit": { "properties": properties } } } })
    }

    #[tokio::test]
    async fn test_ensure_schema_creates_index_and_mapping() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/git"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/git"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/git/_mapping/commit"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/git/_mapping/commit"))
            .and(body_partial_json(json!({
                "properties": {
                    "sha": { "type": "string", "index": "not_analyzed" },
                    "commit_time": {
                        "type": "date",
                        "format": "strict_date_optional_time||epoch_millis",
                    },
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        store(&mock_server.uri()).ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_schema_noop_when_satisfied() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/git"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "git": {} })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/git/_mapping/commit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(full_mapping()))
            .mount(&mock_server)
            .await;
        // No create/update mocks mounted: any write would 404 the mock
        // server and fail the call below.

        store(&mock_server.uri()).ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_schema_patches_missing_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/git"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "git": {} })))
            .mount(&mock_server)
            .await;
        // Mapping exists but lacks repo_url and commit_time.
        Mock::given(method("GET"))
            .and(path("/git/_mapping/commit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "git": { "mappings": { "commit": { "properties": {
                    "namespace": { "type": "string", "index": "not_analyzed" },
                    "repo": { "type": "string", "index": "not_analyzed" },
                    "branch": { "type": "string", "index": "not_analyzed" },
                    "sha": { "type": "string", "index": "not_analyzed" },
                } } } }
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/git/_mapping/commit"))
            .and(body_partial_json(json!({
                "properties": {
                    "repo_url": { "type": "string", "index": "not_analyzed" },
                    "namespace": { "type": "string", "index": "not_analyzed" },
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        store(&mock_server.uri()).ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_boundary_queries_sort_direction() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/git/commit/_search"))
            .and(body_partial_json(
                json!({ "sort": [{ "commit_time": { "order": "desc" } }] }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": { "hits": [{ "_id": "newest" }] }
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/git/commit/_search"))
            .and(body_partial_json(
                json!({ "sort": [{ "commit_time": { "order": "asc" } }] }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": { "hits": [{ "_id": "oldest" }] }
            })))
            .mount(&mock_server)
            .await;

        let store = store(&mock_server.uri());
        assert_eq!(
            store.newest_sha("default", "myapp", "master").await.unwrap(),
            Some("newest".to_string())
        );
        assert_eq!(
            store.oldest_sha("default", "myapp", "master").await.unwrap(),
            Some("oldest".to_string())
        );
    }

    #[tokio::test]
    async fn test_boundary_query_empty_scope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/git/commit/_search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": [] } })),
            )
            .mount(&mock_server)
            .await;

        let store = store(&mock_server.uri());
        assert_eq!(
            store.newest_sha("default", "myapp", "master").await.unwrap(),
            None
        );
    }
}
