use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Embedder trait for converting text to vectors
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn dimensions(&self) -> usize;
}

/// OpenAI-compatible embedding client (POST {base_url}/v1/embeddings)
pub struct OpenAIEmbedder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    dimensions: usize,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAIEmbedder {
    pub fn new(base_url: String, dimensions: usize, insecure_skip_verify: bool) -> Result<Self> {
        let client = if insecure_skip_verify {
            reqwest::Client::builder()
                .danger_accept_invalid_certs(true)
                .build()?
        } else {
            reqwest::Client::new()
        };

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            dimensions,
            model: "text-embedding-3-small".to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut embedder = Self::new(
            config.embedding_url.clone(),
            config.embedding_dimensions,
            config.insecure_skip_verify,
        )?
        .with_model(config.embedding_model.clone());

        if !config.embedding_api_key.is_empty() {
            embedder = embedder.with_api_key(config.embedding_api_key.clone());
        }

        Ok(embedder)
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: text,
            model: &self.model,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .context("Failed to call embedding service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Embedding service returned status {}: {}", status, body);
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .context("Failed to parse embedding response")?;

        let embedding = embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .context("No embedding data in response")?;

        if embedding.len() != self.dimensions {
            anyhow::bail!(
                "Expected embedding dimension {}, got {}",
                self.dimensions,
                embedding.len()
            );
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
