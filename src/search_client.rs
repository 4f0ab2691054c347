use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::collaborators::{SearchResult, WebSearch};
use crate::error::CollaboratorError;

pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";

const SERVICE: &str = "Tavily search";

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyHit>,
}

#[derive(Debug, Deserialize)]
struct TavilyHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    url: String,
}

impl From<TavilyHit> for SearchResult {
    fn from(hit: TavilyHit) -> Self {
        SearchResult {
            title: hit.title,
            snippet: hit.content,
            url: hit.url,
        }
    }
}

/// Web search backed by the Tavily REST API.
///
/// Without an API key every search returns no results, so the chat still works offline.
pub struct SearchClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl SearchClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl WebSearch for SearchClient {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, CollaboratorError> {
        let Some(api_key) = &self.api_key else {
            debug!("Web search disabled, skipping query");
            return Ok(Vec::new());
        };

        let request_body = json!({
            "api_key": api_key,
            "query": query,
            "max_results": top_k,
        });

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request_body)
            .send()
            .await
            .map_err(|source| CollaboratorError::http(SERVICE, source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Search request failed with status {}: {}", status, body);
            return Err(CollaboratorError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|source| CollaboratorError::http(SERVICE, source))?;

        debug!("Search returned {} results", parsed.results.len());

        Ok(parsed
            .results
            .into_iter()
            .take(top_k)
            .map(SearchResult::from)
            .collect())
    }
}
