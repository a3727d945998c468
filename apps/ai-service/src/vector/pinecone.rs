//! Pinecone REST client.
//!
//! `PineconeAdmin` talks to the control plane (list/create/describe indexes).
//! `PineconeIndex` talks to one index's data plane (upsert/query).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::models::TenantId;
use crate::vector::provision::{IndexAdmin, IndexDescription, IndexSpec};
use crate::vector::{
    VectorError, VectorMatch, VectorRecord, VectorResult, VectorStore, JOB_ID_METADATA_KEY,
    TENANT_METADATA_KEY, TEXT_METADATA_KEY,
};

pub const DEFAULT_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    pub index_name: String,
    pub control_plane_url: String,
    /// Data-plane host. Resolved through describe-index when absent.
    pub index_host: Option<String>,
    pub timeout_secs: u64,
}

impl PineconeConfig {
    pub fn new(api_key: String, index_name: String) -> Self {
        Self {
            api_key,
            index_name,
            control_plane_url: DEFAULT_CONTROL_PLANE_URL.to_string(),
            index_host: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_control_plane_url(mut self, url: String) -> Self {
        self.control_plane_url = url;
        self
    }

    pub fn with_index_host(mut self, host: Option<String>) -> Self {
        self.index_host = host;
        self
    }

    fn http_client(&self) -> VectorResult<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| VectorError::StoreUnavailable(format!("Failed to build HTTP client: {e}")))
    }
}

/// Turns non-2xx responses into errors. Throttling and 5xx mean the store is unavailable.
async fn check_status(response: Response) -> VectorResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status.as_u16() == 429 || status.is_server_error() {
        warn!("Pinecone returned {}: {}", status, body);
        Err(VectorError::StoreUnavailable(format!("{status}: {body}")))
    } else {
        Err(VectorError::Api {
            status: status.as_u16(),
            message: body,
        })
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Control plane
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Clone)]
pub struct PineconeAdmin {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PineconeAdmin {
    pub fn new(config: &PineconeConfig) -> VectorResult<Self> {
        Ok(Self {
            client: config.http_client()?,
            api_key: config.api_key.clone(),
            base_url: config.control_plane_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IndexAdmin for PineconeAdmin {
    async fn list_indexes(&self) -> VectorResult<Vec<IndexDescription>> {
        let response = self
            .client
            .get(format!("{}/indexes", self.base_url))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await?;

        let list: IndexList = check_status(response).await?.json().await?;
        Ok(list.indexes)
    }

    async fn create_index(&self, spec: &IndexSpec) -> VectorResult<()> {
        let body = json!({
            "name": spec.name,
            "dimension": spec.dimension,
            "metric": spec.metric,
            "spec": {
                "serverless": {
                    "cloud": spec.cloud,
                    "region": spec.region,
                }
            }
        });

        let response = self
            .client
            .post(format!("{}/indexes", self.base_url))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> VectorResult<IndexDescription> {
        let response = self
            .client
            .get(format!("{}/indexes/{}", self.base_url, name))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Data plane
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<WireVector<'a>>,
}

#[derive(Debug, Serialize)]
struct WireVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    filter: Value,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

/// Server-side metadata filter restricting a query to one tenant.
fn tenant_filter(tenant: &TenantId) -> Value {
    json!({ TENANT_METADATA_KEY: { "$eq": tenant.as_str() } })
}

fn metadata_str(metadata: &Option<Map<String, Value>>, key: &str) -> Option<String> {
    metadata
        .as_ref()
        .and_then(|m| m.get(key))
        .and_then(|v| v.as_str())
        .map(String::from)
}

/// Data-plane client bound to a single index.
#[derive(Clone)]
pub struct PineconeIndex {
    client: Client,
    api_key: String,
    host: String,
}

impl PineconeIndex {
    /// Connects to the configured index, resolving its host if not configured.
    pub async fn connect(config: &PineconeConfig) -> VectorResult<Self> {
        let host = match &config.index_host {
            Some(host) => host.clone(),
            None => {
                let description = PineconeAdmin::new(config)?
                    .describe_index(&config.index_name)
                    .await?;
                if description.host.is_empty() {
                    return Err(VectorError::Decode(format!(
                        "Index '{}' has no host yet; run provision-index first",
                        config.index_name
                    )));
                }
                description.host
            }
        };

        Ok(Self {
            client: config.http_client()?,
            api_key: config.api_key.clone(),
            host: normalize_host(&host),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl VectorStore for PineconeIndex {
    async fn upsert(&self, record: VectorRecord) -> VectorResult<()> {
        let request = UpsertRequest {
            vectors: vec![WireVector {
                id: &record.id,
                values: &record.values,
                metadata: json!({
                    TEXT_METADATA_KEY: record.text.as_str(),
                    JOB_ID_METADATA_KEY: record.id.as_str(),
                    TENANT_METADATA_KEY: record.tenant_id.as_str(),
                }),
            }],
        };

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let upserted: UpsertResponse = check_status(response).await?.json().await?;
        debug!(
            "Pinecone upsert: id={}, upserted_count={}",
            record.id, upserted.upserted_count
        );
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        tenant: &TenantId,
    ) -> VectorResult<Vec<VectorMatch>> {
        let request = QueryRequest {
            vector: &vector,
            top_k,
            filter: tenant_filter(tenant),
            include_metadata: true,
            include_values: false,
        };

        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let result: QueryResponse = check_status(response).await?.json().await?;
        debug!(
            "Pinecone query: tenant={}, top_k={}, matches={}",
            tenant,
            top_k,
            result.matches.len()
        );

        Ok(result
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                job_id: metadata_str(&m.metadata, JOB_ID_METADATA_KEY),
                text: metadata_str(&m.metadata, TEXT_METADATA_KEY),
                id: m.id,
                score: m.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config_for(server: &Server) -> PineconeConfig {
        PineconeConfig::new("pc-key".to_string(), "ledger".to_string())
            .with_control_plane_url(server.url())
            .with_index_host(Some(server.url()))
    }

    fn tenant(raw: &str) -> TenantId {
        TenantId::parse(raw).unwrap()
    }

    #[test]
    fn test_normalize_host_adds_scheme() {
        assert_eq!(
            normalize_host("ledger-abc.svc.pinecone.io"),
            "https://ledger-abc.svc.pinecone.io"
        );
        assert_eq!(normalize_host("http://localhost:5080/"), "http://localhost:5080");
    }

    #[test]
    fn test_tenant_filter_shape() {
        assert_eq!(
            tenant_filter(&tenant("u1")),
            json!({"user_id": {"$eq": "u1"}})
        );
    }

    #[tokio::test]
    async fn test_upsert_sends_tenant_and_text_metadata() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/vectors/upsert")
            .match_header("api-key", "pc-key")
            .match_body(Matcher::PartialJson(json!({
                "vectors": [{
                    "id": "j1",
                    "values": [0.5, 0.25],
                    "metadata": {"text": "Rust engineer", "job_id": "j1", "user_id": "u1"}
                }]
            })))
            .with_status(200)
            .with_body(r#"{"upsertedCount": 1}"#)
            .create_async()
            .await;

        let index = PineconeIndex::connect(&config_for(&server)).await.unwrap();
        index
            .upsert(VectorRecord {
                id: "j1".to_string(),
                values: vec![0.5, 0.25],
                tenant_id: tenant("u1"),
                text: "Rust engineer".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_sends_tenant_filter_and_maps_metadata() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_body(Matcher::PartialJson(json!({
                "topK": 5,
                "filter": {"user_id": {"$eq": "u1"}},
                "includeMetadata": true
            })))
            .with_status(200)
            .with_body(
                json!({
                    "matches": [
                        {"id": "j2", "score": 0.91, "metadata": {"text": "Go backend", "job_id": "j2", "user_id": "u1"}},
                        {"id": "legacy", "score": 0.42}
                    ],
                    "namespace": ""
                })
                .to_string(),
            )
            .create_async()
            .await;

        let index = PineconeIndex::connect(&config_for(&server)).await.unwrap();
        let matches = index.query(vec![0.1, 0.2], 5, &tenant("u1")).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].job_id.as_deref(), Some("j2"));
        assert_eq!(matches[0].text.as_deref(), Some("Go backend"));
        assert!((matches[0].score - 0.91).abs() < f32::EPSILON);
        assert_eq!(matches[1].id, "legacy");
        assert!(matches[1].text.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_store_unavailable() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let index = PineconeIndex::connect(&config_for(&server)).await.unwrap();
        let err = index.query(vec![0.1], 3, &tenant("u1")).await.unwrap_err();
        assert!(matches!(err, VectorError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_client_error_is_api_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/vectors/upsert")
            .with_status(400)
            .with_body("Vector dimension 2 does not match the dimension of the index 384")
            .create_async()
            .await;

        let index = PineconeIndex::connect(&config_for(&server)).await.unwrap();
        let err = index
            .upsert(VectorRecord {
                id: "j1".to_string(),
                values: vec![0.5, 0.25],
                tenant_id: tenant("u1"),
                text: "Rust engineer".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_store_unavailable() {
        let config = PineconeConfig::new("pc-key".to_string(), "ledger".to_string())
            .with_index_host(Some("http://127.0.0.1:1".to_string()));

        let index = PineconeIndex::connect(&config).await.unwrap();
        let err = index.query(vec![0.1], 3, &tenant("u1")).await.unwrap_err();
        assert!(matches!(err, VectorError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_connect_resolves_host_via_describe_index() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/indexes/ledger")
            .match_header("api-key", "pc-key")
            .match_header("x-pinecone-api-version", API_VERSION)
            .with_status(200)
            .with_body(
                json!({
                    "name": "ledger",
                    "dimension": 384,
                    "metric": "cosine",
                    "host": "ledger-abc123.svc.aped-4627-b74a.pinecone.io",
                    "status": {"ready": true, "state": "Ready"}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let config = PineconeConfig::new("pc-key".to_string(), "ledger".to_string())
            .with_control_plane_url(server.url());
        let index = PineconeIndex::connect(&config).await.unwrap();

        assert_eq!(
            index.host(),
            "https://ledger-abc123.svc.aped-4627-b74a.pinecone.io"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_admin_lists_and_creates_indexes() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/indexes")
            .with_status(200)
            .with_body(
                json!({"indexes": [{"name": "ledger", "dimension": 384, "metric": "cosine", "host": "h", "status": {"ready": true, "state": "Ready"}}]})
                    .to_string(),
            )
            .create_async()
            .await;
        let create = server
            .mock("POST", "/indexes")
            .match_body(Matcher::PartialJson(json!({
                "name": "jobs",
                "dimension": 384,
                "metric": "cosine",
                "spec": {"serverless": {"cloud": "aws", "region": "us-east-1"}}
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let admin = PineconeAdmin::new(&config_for(&server)).unwrap();
        let indexes = admin.list_indexes().await.unwrap();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].dimension, 384);
        assert!(indexes[0].status.ready);

        admin
            .create_index(&IndexSpec {
                name: "jobs".to_string(),
                dimension: 384,
                metric: "cosine".to_string(),
                cloud: "aws".to_string(),
                region: "us-east-1".to_string(),
            })
            .await
            .unwrap();
        create.assert_async().await;
    }
}
