//! Web description lookup through the DuckDuckGo RapidAPI proxy.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::errors::UpstreamError;

const SERVICE: &str = "duckduckgo";
pub const DEFAULT_SEARCH_HOST: &str = "duckduckgo8.p.rapidapi.com";
/// Number of result snippets joined into one description
pub const SNIPPET_COUNT: usize = 3;

/// Looks up a short description of a query on the web
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// `Ok(None)` when the search had no usable results
    async fn describe(&self, query: &str) -> Result<Option<String>, UpstreamError>;
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SearchResponse {
    /// First snippets joined by a blank line
    pub fn description(&self) -> Option<String> {
        let snippets: Vec<&str> = self
            .results
            .iter()
            .filter_map(|result| result.description.as_deref())
            .map(str::trim)
            .filter(|snippet| !snippet.is_empty())
            .take(SNIPPET_COUNT)
            .collect();

        if snippets.is_empty() {
            None
        } else {
            Some(snippets.join("\n\n"))
        }
    }
}

pub struct RapidSearchClient {
    client: reqwest::Client,
    api_key: String,
    host: String,
}

impl RapidSearchClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            host: DEFAULT_SEARCH_HOST.to_string(),
        }
    }
}

#[async_trait]
impl WebSearch for RapidSearchClient {
    async fn describe(&self, query: &str) -> Result<Option<String>, UpstreamError> {
        let url = format!("https://{}/", self.host);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await
            .map_err(|e| UpstreamError::http(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| UpstreamError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        debug!(results = parsed.results.len(), "Search results received");
        Ok(parsed.description())
    }
}
