//! External content retrieval used by the exam-detailed responder.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const FIRECRAWL_SEARCH_URL: &str = "https://api.firecrawl.dev/v1/search";

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Defines the contract for any content lookup the responders may use.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Searches for study material. An empty result is not an error.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RetrievalError>;
}

#[derive(Serialize)]
struct FirecrawlRequest<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Deserialize)]
struct FirecrawlResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<FirecrawlItem>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct FirecrawlItem {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<FirecrawlItem> for SearchHit {
    fn from(item: FirecrawlItem) -> Self {
        Self {
            title: item.title.unwrap_or_default(),
            snippet: item.description.unwrap_or_default(),
            url: item.url,
        }
    }
}

/// A `SearchTool` backed by the Firecrawl search API.
pub struct FirecrawlSearch {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    limit: usize,
}

impl FirecrawlSearch {
    pub fn new(api_key: String, limit: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            endpoint: FIRECRAWL_SEARCH_URL.to_string(),
            limit,
        }
    }

    /// Points the client at a different endpoint (self-hosted Firecrawl).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchTool for FirecrawlSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RetrievalError> {
        debug!(%query, limit = self.limit, "Searching Firecrawl");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&FirecrawlRequest {
                query,
                limit: self.limit,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: FirecrawlResponse = response.json().await?;
        if !body.success {
            return Err(RetrievalError::Http(
                body.error
                    .unwrap_or_else(|| "search reported failure".to_string()),
            ));
        }
        Ok(body.data.into_iter().map(SearchHit::from).collect())
    }
}

/// Formats hits as the text a model sees as tool output.
pub fn render_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.".to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("{}. {} ({})\n{}", i + 1, hit.title, hit.url, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n\n")
}
