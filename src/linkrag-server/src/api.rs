use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    web, HttpRequest, HttpResponse, Result as ActixResult,
};
use chrono::Utc;

use linkrag_core::error::RetrievalError;
use linkrag_core::models::{
    AddNoteRequest, AddNoteResponse, DeleteNoteRequest, DeleteNoteResponse, ErrorResponse,
    RetrieveRequest,
};
use linkrag_core::retrieval::Retriever;

/// Shared application state
pub struct AppState {
    pub retriever: Retriever,
}

/// Map a retrieval failure onto 400 / 500 with an ErrorResponse body
fn error_response(err: &RetrievalError) -> HttpResponse {
    if err.is_client_error() {
        tracing::debug!("Rejected request: {}", err);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: err.to_string(),
            message: None,
        });
    }

    tracing::error!("Request failed: {}", err.detail());
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: err.to_string(),
        message: Some(err.detail()),
    })
}

/// Similarity search with optional link following
/// GET /retrieve_db?text=...&top_k=...&follow_links=...
#[tracing::instrument(skip(query, state))]
pub async fn retrieve(
    query: web::Query<RetrieveRequest>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let request = query.into_inner();
    tracing::debug!(
        top_k = request.top_k.as_deref().unwrap_or("default"),
        follow_links = request.follow_links.as_deref().unwrap_or("default"),
        "Retrieving notes"
    );

    match state.retriever.retrieve(request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Embed and store a note
/// POST /add_db
#[tracing::instrument(skip(req, state))]
pub async fn add_note(
    req: web::Json<AddNoteRequest>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let text = req.into_inner().text.unwrap_or_default();

    match state.retriever.add_note(&text).await {
        Ok(id) => Ok(HttpResponse::Ok().json(AddNoteResponse {
            message: "Text added successfully".to_string(),
            id,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Delete a note by id
/// POST /delete_db
#[tracing::instrument(skip(req, state))]
pub async fn delete_note(
    req: web::Json<DeleteNoteRequest>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let id = req.into_inner().id.unwrap_or_default();

    match state.retriever.delete_note(&id).await {
        Ok(details) => Ok(HttpResponse::Ok().json(DeleteNoteResponse {
            message: "Vector deleted successfully".to_string(),
            details,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Health check
/// GET /health
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now()
    })))
}

/// Malformed or missing JSON bodies answer with the same error shape as the handlers
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorResponse {
        error: "invalid JSON body".to_string(),
        message: Some(err.to_string()),
    };
    actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
        .into()
}

/// Query strings that fail to deserialize, e.g. a repeated `text`
fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorResponse {
        error: "invalid query string".to_string(),
        message: Some(err.to_string()),
    };
    actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
        .into()
}

/// Configure routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/retrieve_db", web::get().to(retrieve))
        .route("/add_db", web::post().to(add_note))
        .route("/delete_db", web::post().to(delete_note))
        .route("/health", web::get().to(health));
}
