//! Collaborator fakes shared by the unit tests.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::embedder::Embedder;
use crate::models::{IndexStats, VectorMatch};
use crate::store::VectorStore;

pub fn matched(id: &str, score: f32, text: &str) -> VectorMatch {
    VectorMatch {
        id: id.to_string(),
        score,
        text: text.to_string(),
    }
}

/// Returns a fixed vector per known text and fails for anything else
#[derive(Default)]
pub struct StubEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

#[async_trait::async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no stub embedding for {:?}", text))
    }

    fn dimensions(&self) -> usize {
        self.vectors.values().next().map_or(0, Vec::len)
    }
}

/// Answers queries from a script keyed by the exact query vector
#[derive(Default)]
pub struct ScriptedStore {
    script: Vec<(Vec<f32>, Vec<VectorMatch>)>,
    total: usize,
    top_k_log: Mutex<Vec<usize>>,
    upserts: Mutex<Vec<(String, serde_json::Map<String, serde_json::Value>)>>,
    fail: bool,
    fail_on: Vec<Vec<f32>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, vector: Vec<f32>, matches: Vec<VectorMatch>) -> Self {
        self.script.push((vector, matches));
        self
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = total;
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Fail queries for this exact vector only
    pub fn failing_on(mut self, vector: Vec<f32>) -> Self {
        self.fail_on.push(vector);
        self
    }

    pub fn requested_top_k(&self) -> Vec<usize> {
        self.top_k_log.lock().unwrap().clone()
    }

    pub fn upserts(&self) -> Vec<(String, serde_json::Map<String, serde_json::Value>)> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl VectorStore for ScriptedStore {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        if self.fail || self.fail_on.iter().any(|v| v.as_slice() == vector) {
            anyhow::bail!("store unavailable");
        }
        self.top_k_log.lock().unwrap().push(top_k);
        Ok(self
            .script
            .iter()
            .find(|(v, _)| v.as_slice() == vector)
            .map(|(_, matches)| matches.iter().take(top_k).cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(
        &self,
        id: &str,
        _vector: Vec<f32>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        if self.fail {
            anyhow::bail!("store unavailable");
        }
        self.upserts.lock().unwrap().push((id.to_string(), metadata));
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        if self.fail {
            anyhow::bail!("store unavailable");
        }
        Ok(serde_json::json!({ "deleted": id }))
    }

    async fn stats(&self) -> Result<IndexStats> {
        if self.fail {
            anyhow::bail!("store unavailable");
        }
        Ok(IndexStats {
            total_vector_count: self.total,
            dimension: None,
        })
    }
}
