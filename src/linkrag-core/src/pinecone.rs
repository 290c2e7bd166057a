//! Pinecone REST client implementing [`VectorStore`].
//!
//! Connecting goes through the control plane: the index is created when it
//! does not exist yet, then polled until ready, and its data-plane host is
//! used for every subsequent call.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::StoreConfig;
use crate::models::{IndexStats, VectorMatch};
use crate::store::VectorStore;

pub struct PineconeStore {
    client: Client,
    host: String,
    api_key: String,
    api_version: String,
}

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Debug, Default, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    state: String,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<QueryMatch> for VectorMatch {
    fn from(m: QueryMatch) -> Self {
        let text = m
            .metadata
            .as_ref()
            .and_then(|md| md.get("text"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        VectorMatch {
            id: m.id,
            score: m.score,
            text,
        }
    }
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: Vec<f32>,
    metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: Vec<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeStatsResponse {
    #[serde(default)]
    total_vector_count: usize,
    #[serde(default)]
    dimension: Option<usize>,
}

impl PineconeStore {
    /// Talk to an index whose data-plane host is already known
    pub fn with_host(host: &str, api_key: String, api_version: String) -> Self {
        Self {
            client: Client::new(),
            host: normalize_host(host),
            api_key,
            api_version,
        }
    }

    /// Resolve (creating if needed) the configured index and wait until it is ready
    pub async fn connect(config: &StoreConfig, dimension: usize) -> Result<Self> {
        if config.api_key.is_empty() {
            anyhow::bail!("Pinecone API key is not configured (set PINECONE_API_KEY)");
        }

        let control = ControlPlane {
            client: Client::new(),
            base_url: config.control_plane_url.trim_end_matches('/').to_string(),
            api_key: &config.api_key,
            api_version: &config.api_version,
        };

        let existing = control.list_indexes().await?;
        if existing.iter().any(|i| i.name == config.index_name) {
            tracing::info!(index = %config.index_name, "Using existing Pinecone index");
        } else {
            tracing::info!(
                index = %config.index_name,
                dimension,
                metric = %config.metric,
                "Creating Pinecone index"
            );
            control
                .create_index(&CreateIndexRequest {
                    name: &config.index_name,
                    dimension,
                    metric: &config.metric,
                    spec: IndexSpec {
                        serverless: ServerlessSpec {
                            cloud: &config.cloud,
                            region: &config.region,
                        },
                    },
                })
                .await?;
        }

        let timeout = Duration::from_secs(config.ready_timeout_secs);
        let started = Instant::now();
        let description = loop {
            let description = control.describe_index(&config.index_name).await?;
            if description.status.ready {
                break description;
            }
            if started.elapsed() >= timeout {
                anyhow::bail!(
                    "Pinecone index {} not ready after {:?} (state: {})",
                    config.index_name,
                    timeout,
                    description.status.state
                );
            }
            tracing::debug!(state = %description.status.state, "Waiting for Pinecone index");
            tokio::time::sleep(Duration::from_secs(1)).await;
        };

        if description.host.is_empty() {
            anyhow::bail!("Pinecone index {} has no host", config.index_name);
        }

        tracing::info!(host = %description.host, "Pinecone index ready");
        Ok(Self::with_host(
            &description.host,
            config.api_key.clone(),
            config.api_version.clone(),
        ))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.api_version)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to call Pinecone {}", what))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Pinecone {} returned status {}: {}", what, status, body);
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read Pinecone {} response", what))?;
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(body).with_context(|| format!("Failed to parse Pinecone {} response", what))
    }
}

#[async_trait::async_trait]
impl VectorStore for PineconeStore {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };
        let response: QueryResponse = self
            .send_json(self.post("/query").json(&request), "query")
            .await?;
        Ok(response.matches.into_iter().map(VectorMatch::from).collect())
    }

    async fn upsert(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let request = UpsertRequest {
            vectors: vec![UpsertVector {
                id,
                values: vector,
                metadata,
            }],
        };
        let _: serde_json::Value = self
            .send_json(self.post("/vectors/upsert").json(&request), "upsert")
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        let request = DeleteRequest { ids: vec![id] };
        self.send_json(self.post("/vectors/delete").json(&request), "delete")
            .await
    }

    async fn stats(&self) -> Result<IndexStats> {
        let response: DescribeStatsResponse = self
            .send_json(
                self.post("/describe_index_stats").json(&serde_json::json!({})),
                "describe_index_stats",
            )
            .await?;
        Ok(IndexStats {
            total_vector_count: response.total_vector_count,
            dimension: response.dimension,
        })
    }
}

struct ControlPlane<'a> {
    client: Client,
    base_url: String,
    api_key: &'a str,
    api_version: &'a str,
}

impl ControlPlane<'_> {
    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Api-Key", self.api_key)
            .header("X-Pinecone-API-Version", self.api_version)
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        let response = self
            .request(reqwest::Method::GET, "/indexes")
            .send()
            .await
            .context("Failed to list Pinecone indexes")?;
        let response = check_status(response, "list indexes").await?;
        let list: IndexList = response
            .json()
            .await
            .context("Failed to parse Pinecone index list")?;
        Ok(list.indexes)
    }

    async fn create_index(&self, request: &CreateIndexRequest<'_>) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, "/indexes")
            .json(request)
            .send()
            .await
            .context("Failed to create Pinecone index")?;
        check_status(response, "create index").await?;
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription> {
        let response = self
            .request(reqwest::Method::GET, &format!("/indexes/{}", name))
            .send()
            .await
            .context("Failed to describe Pinecone index")?;
        let response = check_status(response, "describe index").await?;
        response
            .json()
            .await
            .context("Failed to parse Pinecone index description")
    }
}

async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("Pinecone {} returned status {}: {}", what, status, body)
}

/// Data-plane hosts come back without a scheme
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
