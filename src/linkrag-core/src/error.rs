use thiserror::Error;

/// Failures surfaced by retrieval, add and delete operations
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("failed to generate embeddings")]
    EmbeddingFailure(#[source] anyhow::Error),

    #[error("vector store operation failed")]
    StoreFailure(#[source] anyhow::Error),
}

impl RetrievalError {
    pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }

    /// True for caller mistakes (400), false for collaborator failures (500)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_) | Self::InvalidParameter { .. }
        )
    }

    /// Full error chain, for log lines and error bodies
    pub fn detail(&self) -> String {
        match self {
            Self::EmbeddingFailure(e) | Self::StoreFailure(e) => format!("{:#}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
