//! linkrag Core Library
//!
//! This crate provides the core functionality for linkrag, including:
//! - Wikilink extraction from stored snippets
//! - Linked-note resolution with relevance gating
//! - Retrieval orchestration (primary search + one-hop link following)
//! - Embedding and vector store clients

pub mod config;
pub mod embedder;
pub mod error;
pub mod links;
pub mod models;
pub mod pinecone;
pub mod resolver;
pub mod retrieval;
pub mod store;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use embedder::{Embedder, OpenAIEmbedder};
pub use error::RetrievalError;
pub use links::extract_links;
pub use models::*;
pub use pinecone::PineconeStore;
pub use resolver::LinkedNoteResolver;
pub use retrieval::Retriever;
pub use store::{MemoryStore, VectorStore};
