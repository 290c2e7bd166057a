//! linkrag Client Library
//!
//! HTTP client for connecting to linkrag REST API servers.

mod client;

pub use client::{Client, RetrieveOptions, TopK};
pub use linkrag_core::models::{LinkedRetrieval, ResultSource, RetrieveResponse, SearchResult};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;
