//! Fetch boundary for the trademark search API.
//!
//! One POST with a fixed request body, issued once at startup. There are no
//! retries and no cancellation; a failure surfaces as a user-visible message
//! and the dashboard runs over an absent response.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::config::DashboardConfig;
use crate::model::types::SearchResponse;

/// Timeout for the search request.
const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search endpoint returned {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to read response file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct SearchClient {
    http: Client,
    endpoint: String,
    query: String,
    rows: u32,
}

impl SearchClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            query: config.query.clone(),
            rows: config.rows,
        })
    }

    /// Issue the single search POST and decode the envelope.
    pub async fn fetch(&self) -> Result<SearchResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, query = %self.query, "search_fetch_start");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&self.request_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "search_fetch_failed");
            return Err(ClientError::Status(status));
        }

        let parsed: SearchResponse = response.json().await?;
        tracing::info!(hits = parsed.hits().len(), "search_fetch_done");
        Ok(parsed)
    }

    fn request_body(&self) -> serde_json::Value {
        json!({
            "input_query": self.query,
            "input_query_type": "",
            "sort_by": "default",
            "status": [],
            "exact_match": false,
            "date_query": false,
            "owners": [],
            "attorneys": [],
            "law_firms": [],
            "mark_description_description": [],
            "classes": [],
            "page": 1,
            "rows": self.rows,
            "sort_order": "desc",
            "states": [],
            "counties": [],
        })
    }
}

/// Read a saved response JSON from disk instead of fetching.
///
/// Used by `--response-file` and the test fixtures.
pub fn load_response(path: &Path) -> Result<SearchResponse, ClientError> {
    let content = std::fs::read_to_string(path)?;
    let parsed: SearchResponse = serde_json::from_str(&content)?;
    tracing::debug!(path = %path.display(), hits = parsed.hits().len(), "response_loaded");
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let client = SearchClient::new(&DashboardConfig::default()).unwrap();
        let body = client.request_body();

        assert_eq!(body["input_query"], "check");
        assert_eq!(body["page"], 1);
        assert_eq!(body["rows"], 10);
        assert_eq!(body["sort_order"], "desc");
        assert!(body["owners"].as_array().unwrap().is_empty());
        assert!(body["law_firms"].as_array().unwrap().is_empty());
        assert!(body["attorneys"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_request_body_uses_config_values() {
        let config = DashboardConfig {
            query: "widget".into(),
            rows: 25,
            ..Default::default()
        };
        let client = SearchClient::new(&config).unwrap();
        let body = client.request_body();

        assert_eq!(body["input_query"], "widget");
        assert_eq!(body["rows"], 25);
    }

    #[test]
    fn test_load_response_missing_file() {
        let err = load_response(Path::new("/nonexistent/response.json")).unwrap_err();
        assert!(matches!(err, ClientError::Read(_)));
    }

    #[test]
    fn test_load_response_invalid_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_response(&path).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_load_response_tolerates_sparse_payload() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("sparse.json");
        std::fs::write(&path, r#"{"body":{}}"#).unwrap();

        let resp = load_response(&path).unwrap();
        assert!(resp.hits().is_empty());
        assert!(resp.owners().is_empty());
    }
}
