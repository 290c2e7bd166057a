use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use linkrag_core::config::RetrievalConfig;
use linkrag_core::embedder::Embedder;
use linkrag_core::retrieval::Retriever;
use linkrag_core::store::MemoryStore;
use linkrag_server::api::{self, AppState};

const KICKOFF: &str = "Kickoff notes. See [[Roadmap]] for details";
const MILESTONES: &str = "Milestones for Q3";

/// Fixed vectors per known text; anything else fails like a down embedding service
struct FixedEmbedder {
    vectors: HashMap<&'static str, Vec<f32>>,
}

impl FixedEmbedder {
    fn new() -> Self {
        let vectors = HashMap::from([
            (KICKOFF, vec![1.0, 0.0, 0.0]),
            (MILESTONES, vec![0.0, 1.0, 0.0]),
            ("project planning", vec![1.0, 0.0, 0.0]),
            ("Roadmap", vec![0.1, 1.0, 0.0]),
        ]);
        Self { vectors }
    }
}

#[async_trait::async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("embedding service unavailable"))
    }

    fn dimensions(&self) -> usize {
        3
    }
}

fn app_state() -> web::Data<AppState> {
    web::Data::new(AppState {
        retriever: Retriever::new(
            Arc::new(FixedEmbedder::new()),
            Arc::new(MemoryStore::new()),
            RetrievalConfig::default(),
        ),
    })
}

macro_rules! spawn_app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(api::configure)).await
    };
}

macro_rules! add_note {
    ($app:expr, $text:expr) => {{
        let req = test::TestRequest::post()
            .uri("/add_db")
            .set_json(json!({ "text": $text }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        assert_eq!(body["message"], "Text added successfully");
        body["id"].as_str().expect("id in response").to_string()
    }};
}

#[actix_web::test]
async fn test_health() {
    let state = app_state();
    let app = spawn_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_retrieve_follows_links() {
    let state = app_state();
    let app = spawn_app!(state);

    let kickoff_id = add_note!(app, KICKOFF);
    let milestones_id = add_note!(app, MILESTONES);

    let req = test::TestRequest::get()
        .uri("/retrieve_db?text=project%20planning&top_k=1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["primary_results"].as_array().unwrap().len(), 1);
    assert_eq!(body["primary_results"][0]["id"], kickoff_id.as_str());
    assert_eq!(body["primary_results"][0]["source"], "primary");
    assert_eq!(body["extracted_links"], json!(["Roadmap"]));

    let linked = body["linked_results"].as_array().unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0]["id"], milestones_id.as_str());
    assert_eq!(linked[0]["source"], "linked");
    assert_eq!(linked[0]["linked_from"], "Roadmap");
    assert!(body["hint"].is_string());
}

#[actix_web::test]
async fn test_retrieve_without_links_is_flat() {
    let state = app_state();
    let app = spawn_app!(state);

    add_note!(app, KICKOFF);
    add_note!(app, MILESTONES);

    let req = test::TestRequest::get()
        .uri("/retrieve_db?text=project%20planning&top_k=all&follow_links=false")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let results = body.as_array().expect("flat array");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["source"] == "primary"));
    assert!(results.iter().all(|r| r.get("linked_from").is_none()));
}

#[actix_web::test]
async fn test_retrieve_bad_requests() {
    let state = app_state();
    let app = spawn_app!(state);

    for uri in [
        "/retrieve_db",
        "/retrieve_db?text=",
        "/retrieve_db?text=project%20planning&top_k=ten",
        "/retrieve_db?text=project%20planning&follow_links=sometimes",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status().as_u16(), 400, "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}

#[actix_web::test]
async fn test_retrieve_malformed_query_is_json_400() {
    let state = app_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::get()
        .uri("/retrieve_db?text=kickoff&text=milestones")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid query string");
    assert!(body["message"].as_str().unwrap().contains("text"));
}

#[actix_web::test]
async fn test_retrieve_embedding_failure_is_500() {
    let state = app_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::get()
        .uri("/retrieve_db?text=nothing%20embeds%20this")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 500);
}

#[actix_web::test]
async fn test_add_validation_and_failures() {
    let state = app_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::post()
        .uri("/add_db")
        .set_json(json!({}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);

    let req = test::TestRequest::post()
        .uri("/add_db")
        .insert_header(("content-type", "application/json"))
        .set_payload("not json")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);

    let req = test::TestRequest::post()
        .uri("/add_db")
        .set_json(json!({ "text": "unknown to the embedder" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 500);
}

#[actix_web::test]
async fn test_delete() {
    let state = app_state();
    let app = spawn_app!(state);

    let id = add_note!(app, MILESTONES);

    let req = test::TestRequest::post()
        .uri("/delete_db")
        .set_json(json!({ "id": id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Vector deleted successfully");
    assert!(body.get("details").is_some());

    let stats = state.retriever.stats().await.unwrap();
    assert_eq!(stats.total_vector_count, 0);

    let req = test::TestRequest::post()
        .uri("/delete_db")
        .set_json(json!({}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);
}
