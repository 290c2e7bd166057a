//! In-Memory Retrieval Example
//!
//! Stores a few linked notes in the in-process vector store and runs a
//! link-following retrieval against them. Embeddings come from the configured
//! OpenAI-compatible service.
//!
//! Run with: OPENAI_API_KEY=... cargo run --example memory_backend

use linkrag_core::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("linkrag In-Memory Example\n");

    let config = Config::default().with_env_overrides();
    let retriever = Retriever::new(
        Arc::new(OpenAIEmbedder::from_config(&config)?),
        Arc::new(MemoryStore::new()),
        config.retrieval.clone(),
    );
    println!("✅ Retriever initialized\n");

    let notes = [
        "Project planning kickoff. See [[Roadmap]] and [[Team|who is involved]].",
        "Roadmap: Q1 ship the importer, Q2 harden search, Q3 launch sync.",
        "Team: Ana owns search, Bo owns the importer.",
        "Unrelated grocery list: eggs, coffee, bread.",
    ];
    for note in notes {
        let id = retriever.add_note(note).await?;
        println!("📝 Added note {}", id);
    }

    let response = retriever
        .retrieve(RetrieveRequest::new("project planning").top_k("1"))
        .await?;

    match response {
        RetrieveResponse::Linked(result) => {
            println!("\n🔍 Primary results:");
            for r in &result.primary_results {
                println!("   {:.4}  {}", r.score, r.text);
            }
            println!("\n🔗 Extracted links: {:?}", result.extracted_links);
            println!("\n📎 Linked results:");
            for r in &result.linked_results {
                println!(
                    "   {:.4}  [{}]  {}",
                    r.score,
                    r.linked_from.as_deref().unwrap_or_default(),
                    r.text
                );
            }
        }
        RetrieveResponse::Flat(results) => {
            println!("\n🔍 Results: {}", results.len());
        }
    }

    Ok(())
}
