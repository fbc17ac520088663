use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use scholia_core::error::{Result, ScholiaError};

use crate::retry::{RequestFailure, RetryPolicy, Sleeper};

const SEARCH_FIELDS: &str = "title";
const LIST_FIELDS: &str = "title,publicationDate,citationCount";
const LIST_LIMIT: u32 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// One GET against the bibliographic service, returning the decoded body.
#[async_trait]
pub trait ScholarTransport: Send + Sync {
    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<Value, RequestFailure>;
}

pub struct HttpScholarTransport {
    client: Client,
    base_url: String,
}

impl HttpScholarTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| ScholiaError::Config(format!("invalid S2_API_BASE '{base_url}': {e}")))?;
        let client = Client::builder()
            .user_agent("scholia/0.1")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str, params: &[(&str, String)]) -> String {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}{path}?{query}", self.base_url)
    }
}

#[async_trait]
impl ScholarTransport for HttpScholarTransport {
    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<Value, RequestFailure> {
        let url = self.url_for(path, params);
        debug!(url = %url, "Calling bibliographic service");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RequestFailure::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RequestFailure::RateLimited);
        }
        if !status.is_success() {
            return Err(RequestFailure::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RequestFailure::Decode(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    paper_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Typed calls against Semantic Scholar's graph API, each wrapped in the
/// retry policy. Every call degrades to `None`/empty instead of failing.
pub struct SemanticScholarClient {
    transport: Arc<dyn ScholarTransport>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl SemanticScholarClient {
    pub fn new(transport: Arc<dyn ScholarTransport>, retry: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            transport,
            retry,
            sleeper,
        }
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Option<Value> {
        self.retry
            .run(self.sleeper.as_ref(), path, || self.transport.get_json(path, params))
            .await
    }

    /// External id of the single best title match.
    pub async fn search_paper_id(&self, title: &str) -> Option<String> {
        let params = [
            ("query", title.to_string()),
            ("fields", SEARCH_FIELDS.to_string()),
            ("limit", "1".to_string()),
        ];
        let body = self.get("/paper/search", &params).await?;
        let page: SearchPage = match serde_json::from_value(body) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, "Unexpected search response shape");
                return None;
            }
        };
        if page.total == 0 {
            return None;
        }
        let hit = page.data.into_iter().next()?;
        let id = hit.paper_id.filter(|id| !id.is_empty())?;
        info!(paper_id = %id, matched_title = hit.title.as_deref().unwrap_or(""), "Resolved title");
        Some(id)
    }

    /// Papers `paper_id` cites (first page).
    pub async fn references(&self, paper_id: &str) -> Vec<Value> {
        self.list(paper_id, "references", "citedPaper").await
    }

    /// Papers citing `paper_id` (first page).
    pub async fn citations(&self, paper_id: &str) -> Vec<Value> {
        self.list(paper_id, "citations", "citingPaper").await
    }

    async fn list(&self, paper_id: &str, endpoint: &str, nested: &str) -> Vec<Value> {
        let params = [
            ("fields", LIST_FIELDS.to_string()),
            ("limit", LIST_LIMIT.to_string()),
        ];
        let path = format!("/paper/{}/{endpoint}", urlencoding::encode(paper_id));
        let Some(body) = self.get(&path, &params).await else {
            return Vec::new();
        };
        let papers: Vec<Value> = body
            .get("data")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(nested))
                    .filter(|paper| !paper.is_null())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        debug!(paper_id, endpoint, count = papers.len(), "Fetched paper list");
        papers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_encodes_query_values() {
        let transport = HttpScholarTransport::new("https://api.semanticscholar.org/graph/v1/").unwrap();
        let url = transport.url_for("/paper/search", &[("query", "A & B".into()), ("limit", "1".into())]);
        assert_eq!(
            url,
            "https://api.semanticscholar.org/graph/v1/paper/search?query=A%20%26%20B&limit=1"
        );
    }

    #[test]
    fn rejects_invalid_base() {
        assert!(matches!(
            HttpScholarTransport::new("not a url"),
            Err(ScholiaError::Config(_))
        ));
    }

    #[test]
    fn search_page_tolerates_missing_fields() {
        let page: SearchPage = serde_json::from_value(json!({"total": 1, "data": [{"paperId": "p1"}]})).unwrap();
        assert_eq!(page.data[0].paper_id.as_deref(), Some("p1"));
        let empty: SearchPage = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.total, 0);
    }
}
