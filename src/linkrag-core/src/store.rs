use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::{IndexStats, VectorMatch};

/// Similarity store the service delegates persistence and ranking to
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Top `top_k` matches for `vector`, best first
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>>;

    async fn upsert(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()>;

    /// Returns the backend's raw response body
    async fn delete(&self, id: &str) -> Result<serde_json::Value>;

    async fn stats(&self) -> Result<IndexStats>;
}

struct StoredVector {
    vector: Vec<f32>,
    metadata: serde_json::Map<String, serde_json::Value>,
}

/// In-process store ranking by cosine similarity
#[derive(Default)]
pub struct MemoryStore {
    vectors: RwLock<HashMap<String, StoredVector>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VectorStore for MemoryStore {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        let vectors = self.vectors.read().await;

        let mut results: Vec<VectorMatch> = vectors
            .iter()
            .map(|(id, stored)| VectorMatch {
                id: id.clone(),
                score: cosine_similarity(vector, &stored.vector) as f32,
                text: stored
                    .metadata
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();

        // Sort by similarity (descending), id breaks ties
        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        results.truncate(top_k);

        Ok(results)
    }

    async fn upsert(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let mut vectors = self.vectors.write().await;
        if let Some(existing) = vectors.values().next() {
            if existing.vector.len() != vector.len() {
                anyhow::bail!(
                    "Vector dimension {} does not match index dimension {}",
                    vector.len(),
                    existing.vector.len()
                );
            }
        }
        vectors.insert(id.to_string(), StoredVector { vector, metadata });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        // Deleting an unknown id is not an error, same as the remote store
        self.vectors.write().await.remove(id);
        Ok(serde_json::json!({}))
    }

    async fn stats(&self) -> Result<IndexStats> {
        let vectors = self.vectors.read().await;
        Ok(IndexStats {
            total_vector_count: vectors.len(),
            dimension: vectors.values().next().map(|v| v.vector.len()),
        })
    }
}

/// Calculate cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b) {
        dot_product += (x * y) as f64;
        norm_a += (x * x) as f64;
        norm_b += (y * y) as f64;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a.sqrt() * norm_b.sqrt())
}
