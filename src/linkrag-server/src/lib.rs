//! linkrag - graph-aware retrieval over a hosted vector database
//!
//! This crate provides both a library and binary for running the linkrag
//! HTTP service.
//!
//! # Embedded Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use linkrag_core::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default().with_env_overrides();
//!     let retriever = Retriever::new(
//!         Arc::new(OpenAIEmbedder::from_config(&config)?),
//!         Arc::new(MemoryStore::new()),
//!         config.retrieval.clone(),
//!     );
//!     let response = retriever.retrieve(RetrieveRequest::new("project planning")).await?;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```
//!
//! # Server Usage
//!
//! Run the binary to start the REST API server:
//! ```bash
//! linkrag-server
//! ```

pub use linkrag_core;

pub mod api;
pub mod telemetry;
