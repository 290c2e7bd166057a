use crate::{ClientError, Result};
use linkrag_core::models::{
    AddNoteRequest, AddNoteResponse, DeleteNoteRequest, DeleteNoteResponse, ErrorResponse,
    RetrieveResponse,
};
use reqwest::Client as HttpClient;

/// linkrag REST API Client
pub struct Client {
    base_url: String,
    client: HttpClient,
}

/// Optional parameters for [`Client::retrieve`]
#[derive(Debug, Clone, Default)]
pub struct RetrieveOptions {
    /// `None` uses the server default
    pub top_k: Option<TopK>,
    /// `None` uses the server default (follow links)
    pub follow_links: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopK {
    Count(usize),
    /// Everything in the index
    All,
}

impl RetrieveOptions {
    fn query_pairs(&self, text: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("text", text.to_string())];
        match self.top_k {
            Some(TopK::Count(n)) => pairs.push(("top_k", n.to_string())),
            Some(TopK::All) => pairs.push(("top_k", "all".to_string())),
            None => {}
        }
        if let Some(follow) = self.follow_links {
            pairs.push(("follow_links", follow.to_string()));
        }
        pairs
    }
}

impl Client {
    /// Create a new client connected to the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: HttpClient::new(),
        }
    }

    /// Similarity search; the response shape follows `options.follow_links`
    pub async fn retrieve(&self, text: &str, options: &RetrieveOptions) -> Result<RetrieveResponse> {
        let url = format!("{}/retrieve_db", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&options.query_pairs(text))
            .send()
            .await?;

        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// Add a note, returning its generated id
    pub async fn add(&self, text: impl Into<String>) -> Result<String> {
        let url = format!("{}/add_db", self.base_url);
        let req = AddNoteRequest {
            text: Some(text.into()),
        };

        let response = self.client.post(&url).json(&req).send().await?;
        let response = check(response).await?;

        let body: AddNoteResponse = response.json().await?;
        Ok(body.id)
    }

    /// Delete a note by id, returning the store's details
    pub async fn delete(&self, id: impl Into<String>) -> Result<serde_json::Value> {
        let url = format!("{}/delete_db", self.base_url);
        let req = DeleteNoteRequest {
            id: Some(id.into()),
        };

        let response = self.client.post(&url).json(&req).send().await?;
        let response = check(response).await?;

        let body: DeleteNoteResponse = response.json().await?;
        Ok(body.details)
    }

    /// Health check
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;
        check(response).await?;

        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    // Prefer the server's error field when the body is an ErrorResponse
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => match err.message {
            Some(detail) => format!("{}: {}", err.error, detail),
            None => err.error,
        },
        Err(_) => body,
    };

    Err(ClientError::Server { status, message })
}
