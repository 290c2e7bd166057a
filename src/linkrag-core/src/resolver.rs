use std::collections::HashSet;
use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::embedder::Embedder;
use crate::models::{SearchResult, VectorMatch};
use crate::store::VectorStore;

/// Follows referenced note names with one similarity search each
pub struct LinkedNoteResolver<'a> {
    embedder: &'a dyn Embedder,
    store: &'a dyn VectorStore,
    top_k: usize,
    score_threshold: f32,
}

impl<'a> LinkedNoteResolver<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        store: &'a dyn VectorStore,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k: config.linked_top_k,
            score_threshold: config.link_score_threshold,
        }
    }

    /// Resolve `note_names` in order, skipping ids in `already_seen`.
    ///
    /// Every accepted id is inserted into `already_seen` as soon as it is
    /// accepted, so a later note name cannot admit it again. A failure for one
    /// note name only drops that name.
    #[tracing::instrument(skip(self, note_names, already_seen), fields(links = note_names.len()))]
    pub async fn resolve_linked(
        &self,
        note_names: &[String],
        original_query: &str,
        already_seen: &mut HashSet<String>,
    ) -> Vec<SearchResult> {
        let mut linked = Vec::new();

        for note_name in note_names {
            // Embed the bare note name, not the query
            let vector = match self.embedder.embed(note_name).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(note = %note_name, "Skipping linked note, embedding failed: {:#}", e);
                    continue;
                }
            };

            let matches = match self.store.query(&vector, self.top_k).await {
                Ok(m) => m,
                Err(e) => {
                    warn!(note = %note_name, "Skipping linked note, search failed: {:#}", e);
                    continue;
                }
            };

            for candidate in matches {
                if already_seen.contains(&candidate.id) {
                    continue;
                }
                if !passes_relevance_gate(note_name, &candidate, self.score_threshold) {
                    debug!(note = %note_name, id = %candidate.id, score = candidate.score, "Rejected linked match");
                    continue;
                }

                already_seen.insert(candidate.id.clone());
                linked.push(SearchResult::linked(candidate, note_name));
            }
        }

        debug!(accepted = linked.len(), "Linked notes resolved");
        linked
    }
}

/// Keep a match that scores above `threshold` or whose text mentions the note name
pub fn passes_relevance_gate(note_name: &str, candidate: &VectorMatch, threshold: f32) -> bool {
    candidate.score > threshold
        || candidate
            .text
            .to_lowercase()
            .contains(&note_name.to_lowercase())
}
