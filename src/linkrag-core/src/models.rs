use serde::{Deserialize, Serialize};

/// Advisory text attached to every link-following response
pub const LINKED_RESULTS_HINT: &str = "linked_results holds notes reached by following [[wikilinks]] \
found in primary_results; each entry names the link it came from in linked_from. \
Treat them as supporting context for the primary results, not as direct matches for the query.";

/// Where a search result came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Primary,
    Linked,
}

/// A single retrieved snippet, annotated with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub source: ResultSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_from: Option<String>, // Set only for linked results
}

impl SearchResult {
    pub fn primary(m: VectorMatch) -> Self {
        Self {
            id: m.id,
            score: m.score,
            text: m.text,
            source: ResultSource::Primary,
            linked_from: None,
        }
    }

    pub fn linked(m: VectorMatch, note_name: &str) -> Self {
        Self {
            id: m.id,
            score: m.score,
            text: m.text,
            source: ResultSource::Linked,
            linked_from: Some(note_name.to_string()),
        }
    }
}

/// Raw match returned by a vector store query
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub text: String,
}

/// Index statistics reported by the vector store
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStats {
    pub total_vector_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
}

/// Raw retrieval parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrieveRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub top_k: Option<String>, // Integer or "all"
    #[serde(default)]
    pub follow_links: Option<String>, // "true" / "false"
}

impl RetrieveRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn top_k(mut self, top_k: impl Into<String>) -> Self {
        self.top_k = Some(top_k.into());
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = Some(follow.to_string());
        self
    }
}

/// Retrieval response; the shape depends on whether links were followed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RetrieveResponse {
    Linked(LinkedRetrieval),
    Flat(Vec<SearchResult>),
}

/// Two-tier result produced when link following is enabled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedRetrieval {
    pub primary_results: Vec<SearchResult>,
    pub linked_results: Vec<SearchResult>,
    pub extracted_links: Vec<String>,
    pub hint: String,
}

/// POST /add_db body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddNoteRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /add_db response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNoteResponse {
    pub message: String,
    pub id: String,
}

/// POST /delete_db body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteNoteRequest {
    #[serde(default)]
    pub id: Option<String>,
}

/// POST /delete_db response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteNoteResponse {
    pub message: String,
    pub details: serde_json::Value,
}

/// ErrorResponse represents an API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_result_omits_linked_from() {
        let result = SearchResult::primary(VectorMatch {
            id: "a".to_string(),
            score: 0.5,
            text: "hello".to_string(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "primary");
        assert!(json.get("linked_from").is_none());
    }

    #[test]
    fn test_linked_result_carries_provenance() {
        let result = SearchResult::linked(
            VectorMatch {
                id: "b".to_string(),
                score: 0.8,
                text: "roadmap".to_string(),
            },
            "Roadmap",
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "linked");
        assert_eq!(json["linked_from"], "Roadmap");
    }

    #[test]
    fn test_response_shapes() {
        let flat = RetrieveResponse::Flat(vec![]);
        assert!(serde_json::to_value(&flat).unwrap().is_array());

        let linked = RetrieveResponse::Linked(LinkedRetrieval {
            primary_results: vec![],
            linked_results: vec![],
            extracted_links: vec!["A".to_string()],
            hint: LINKED_RESULTS_HINT.to_string(),
        });
        let json = serde_json::to_value(&linked).unwrap();
        assert!(json.is_object());
        assert_eq!(json["extracted_links"][0], "A");

        // Deserializing an object must land on the linked variant
        let back: RetrieveResponse = serde_json::from_value(json).unwrap();
        assert!(matches!(back, RetrieveResponse::Linked(_)));
    }
}
