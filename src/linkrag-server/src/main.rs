use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use linkrag_core::config::{Config, StoreBackend};
use linkrag_core::embedder::{Embedder, OpenAIEmbedder};
use linkrag_core::pinecone::PineconeStore;
use linkrag_core::retrieval::Retriever;
use linkrag_core::store::{MemoryStore, VectorStore};
use linkrag_server::{api, telemetry};

#[actix_web::main]
async fn main() -> Result<()> {
    // Telemetry settings come from the config, so a load failure is logged afterwards
    let (config, load_error) = match Config::load("config.json") {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let config = config.with_env_overrides();

    let _guard = telemetry::init_telemetry(&config.logging)?;
    if let Some(e) = load_error {
        tracing::warn!("Failed to load config.json ({}), using defaults", e);
    }

    tracing::info!("linkrag starting");
    tracing::info!("  Port: {}", config.port);
    tracing::info!("  Embedding URL: {}", config.embedding_url);
    tracing::info!(
        "  Embedding model: {} ({} dimensions)",
        config.embedding_model,
        config.embedding_dimensions
    );
    tracing::info!(
        "  Store: backend={:?}, index={}",
        config.store.backend,
        config.store.index_name
    );
    tracing::info!(
        "  Retrieval: default_top_k={}, linked_top_k={}, link_score_threshold={}",
        config.retrieval.default_top_k,
        config.retrieval.linked_top_k,
        config.retrieval.link_score_threshold
    );

    if config.embedding_api_key.is_empty() {
        tracing::warn!("No embedding API key configured (OPENAI_API_KEY)");
    }

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_config(&config)?);
    tracing::info!("✓ Embedder initialized");

    let store: Arc<dyn VectorStore> = match config.store.backend {
        StoreBackend::Pinecone => Arc::new(
            PineconeStore::connect(&config.store, embedder.dimensions()).await?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory vector store; notes are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!("✓ Vector store initialized");

    let app_state = web::Data::new(api::AppState {
        retriever: Retriever::new(embedder, store, config.retrieval.clone()),
    });

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("🚀 Starting HTTP server on {}", bind_addr);

    let cors_config = config.cors.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();

        if cors_config.enabled {
            for origin in &cors_config.allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            cors = cors
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![
                    actix_web::http::header::ACCEPT,
                    actix_web::http::header::CONTENT_TYPE,
                ])
                .max_age(3600);
        }

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .configure(api::configure)
    })
    .bind(&bind_addr)?
    .run();

    tracing::info!("Server running, press Ctrl+C to stop");

    server.await?;

    tracing::info!("Server stopped");
    Ok(())
}
