use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::RetrievalConfig;
use crate::embedder::Embedder;
use crate::error::{Result, RetrievalError};
use crate::links::extract_links_from_all;
use crate::models::{
    IndexStats, LinkedRetrieval, RetrieveRequest, RetrieveResponse, SearchResult,
    LINKED_RESULTS_HINT,
};
use crate::resolver::LinkedNoteResolver;
use crate::store::VectorStore;

/// Coordinates primary search, link extraction and linked-note resolution.
///
/// Each call builds its own result lists and seen-id set; nothing is shared
/// between requests except the collaborator clients.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

/// How many primary results to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopK {
    Count(usize),
    All,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Similarity search with optional one-hop link following
    #[tracing::instrument(skip(self, request))]
    pub async fn retrieve(&self, request: RetrieveRequest) -> Result<RetrieveResponse> {
        let query = non_empty(request.text.as_deref())
            .ok_or(RetrievalError::MissingParameter("text"))?;
        let top_k = self.parse_top_k(request.top_k.as_deref())?;
        let follow_links = parse_follow_links(request.follow_links.as_deref())?;

        let top_k = match top_k {
            TopK::Count(n) => n,
            TopK::All => self.stats().await?.total_vector_count,
        };
        debug!(top_k, follow_links, "Retrieval parameters resolved");

        let primary = self.primary_search(query, top_k).await?;

        if !follow_links {
            return Ok(RetrieveResponse::Flat(primary));
        }

        let extracted = extract_links_from_all(primary.iter().map(|r| r.text.as_str()));
        let extracted_links: Vec<String> = extracted.into_iter().collect();

        let linked_results = if extracted_links.is_empty() {
            Vec::new()
        } else {
            let mut already_seen: HashSet<String> =
                primary.iter().map(|r| r.id.clone()).collect();
            LinkedNoteResolver::new(self.embedder.as_ref(), self.store.as_ref(), &self.config)
                .resolve_linked(&extracted_links, query, &mut already_seen)
                .await
        };

        debug!(
            primary = primary.len(),
            links = extracted_links.len(),
            linked = linked_results.len(),
            "Retrieval complete"
        );

        Ok(RetrieveResponse::Linked(LinkedRetrieval {
            primary_results: primary,
            linked_results,
            extracted_links,
            hint: LINKED_RESULTS_HINT.to_string(),
        }))
    }

    async fn primary_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(RetrievalError::EmbeddingFailure)?;

        // An empty index under top_k=all has nothing to rank
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let matches = self
            .store
            .query(&vector, top_k)
            .await
            .map_err(RetrievalError::StoreFailure)?;

        Ok(matches.into_iter().map(SearchResult::primary).collect())
    }

    /// Embed `text` and store it under a fresh id, returning the id
    #[tracing::instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn add_note(&self, text: &str) -> Result<String> {
        let text = non_empty(Some(text)).ok_or(RetrievalError::MissingParameter("text"))?;

        let vector = self
            .embedder
            .embed(text)
            .await
            .map_err(RetrievalError::EmbeddingFailure)?;

        let id = Uuid::new_v4().to_string();
        let mut metadata = serde_json::Map::new();
        metadata.insert("text".to_string(), serde_json::Value::String(text.to_string()));

        self.store
            .upsert(&id, vector, metadata)
            .await
            .map_err(RetrievalError::StoreFailure)?;

        info!(id = %id, "Note added");
        Ok(id)
    }

    /// Delete a stored note, returning the store's response
    #[tracing::instrument(skip(self))]
    pub async fn delete_note(&self, id: &str) -> Result<serde_json::Value> {
        let id = non_empty(Some(id)).ok_or(RetrievalError::MissingParameter("id"))?;

        let details = self
            .store
            .delete(id)
            .await
            .map_err(RetrievalError::StoreFailure)?;

        info!(id = %id, "Note deleted");
        Ok(details)
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        self.store.stats().await.map_err(RetrievalError::StoreFailure)
    }

    fn parse_top_k(&self, raw: Option<&str>) -> Result<TopK> {
        let Some(raw) = non_empty(raw.map(str::trim)) else {
            return Ok(TopK::Count(self.config.default_top_k));
        };

        if raw.eq_ignore_ascii_case("all") {
            return Ok(TopK::All);
        }

        match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(TopK::Count(n)),
            _ => Err(RetrievalError::invalid("top_k", raw)),
        }
    }
}

fn parse_follow_links(raw: Option<&str>) -> Result<bool> {
    match non_empty(raw) {
        None => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(RetrievalError::invalid("follow_links", v)),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
