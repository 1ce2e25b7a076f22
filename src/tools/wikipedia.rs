//! Encyclopedia summary lookup.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use super::{InputContract, Tool, ToolInput};
use crate::error::ToolError;

pub const DEFAULT_WIKIPEDIA_URL: &str = "https://en.wikipedia.org";

const SEARCH_PATH: &str = "/w/rest.php/v1/search/title";
const SUMMARY_PATH: &str = "/api/rest_v1/page/summary";
const USER_AGENT: &str = "tool-agent/0.1";
const SUMMARY_SENTENCES: usize = 2;

/// Searches for a topic and returns the first sentences of the best match's
/// summary.
///
/// Lookup failures are turned into a diagnostic answer instead of an error,
/// so the model can see that nothing was found and carry on.
#[derive(Clone)]
pub struct Wikipedia {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Default for Wikipedia {
    fn default() -> Self {
        Self::new(DEFAULT_WIKIPEDIA_URL, Duration::from_secs(30))
    }
}

#[derive(Deserialize)]
struct SearchResults {
    #[serde(default)]
    pages: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    key: String,
}

#[derive(Deserialize)]
struct Summary {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    extract: String,
}

impl Wikipedia {
    /// `base_url` is the wiki's site root, e.g. `https://en.wikipedia.org`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    async fn lookup(&self, query: &str) -> Result<String, ToolError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ToolError::lookup(query, "empty query"));
        }

        let key = self.search(query).await?;
        tracing::debug!("Wikipedia search for '{}' matched '{}'", query, key);
        self.summary(query, &key).await
    }

    /// Resolve a free-form query to the page key of the top search hit.
    async fn search(&self, query: &str) -> Result<String, ToolError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .query(&[("q", query), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ToolError::lookup(query, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::lookup(query, format!("search HTTP error: {}", status)));
        }

        let results: SearchResults = response
            .json()
            .await
            .map_err(|e| ToolError::lookup(query, format!("invalid search response: {}", e)))?;

        results
            .pages
            .into_iter()
            .next()
            .map(|hit| hit.key)
            .ok_or_else(|| ToolError::lookup(query, "no matching article"))
    }

    async fn summary(&self, query: &str, key: &str) -> Result<String, ToolError> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            SUMMARY_PATH,
            urlencoding::encode(&key.replace(' ', "_"))
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ToolError::lookup(query, e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ToolError::lookup(query, "page not found"));
        }
        if !status.is_success() {
            return Err(ToolError::lookup(query, format!("HTTP error: {}", status)));
        }

        let summary: Summary = response
            .json()
            .await
            .map_err(|e| ToolError::lookup(query, format!("invalid response: {}", e)))?;

        if summary.kind == "disambiguation" {
            return Err(ToolError::lookup(
                query,
                "the title is ambiguous; try a more specific query",
            ));
        }
        if summary.extract.trim().is_empty() {
            return Err(ToolError::lookup(query, "no summary available"));
        }

        Ok(first_sentences(&summary.extract, SUMMARY_SENTENCES))
    }
}

fn sentence_end() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?](\s+|$)").ok()).as_ref()
}

/// Keep at most `count` sentences of `text`.
fn first_sentences(text: &str, count: usize) -> String {
    let text = text.trim();
    let end = sentence_end().and_then(|re| re.find_iter(text).nth(count.saturating_sub(1)));
    match end {
        Some(end) => text[..end.start() + 1].to_string(),
        None => text.to_string(),
    }
}

#[async_trait]
impl Tool for Wikipedia {
    fn name(&self) -> &str {
        "Wikipedia"
    }

    fn description(&self) -> &str {
        "Useful for when you need to know information about a topic."
    }

    fn input_contract(&self) -> InputContract {
        InputContract::Structured(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to look up on Wikipedia"
                }
            },
            "required": ["query"]
        }))
    }

    async fn execute(&self, input: ToolInput) -> Result<String, ToolError> {
        let query = input
            .field("query")
            .ok_or_else(|| ToolError::invalid_input(self.name(), "missing 'query'"))?;

        match self.lookup(query).await {
            Ok(result) => {
                tracing::info!("Wikipedia result for '{}': {}", query, result);
                Ok(result)
            }
            Err(e) => {
                let message = format!("I couldn't find any information on that. Error: {}", e);
                tracing::error!("Wikipedia search error for '{}': {}", query, message);
                Ok(message)
            }
        }
    }
}
