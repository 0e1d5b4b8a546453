//! HTTP client for the record data service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Records fetched per collection request.
const PER_PAGE: u32 = 200;

/// Newest records first.
const DEFAULT_SORT: &str = "-created";

/// Timeout for a single data service request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("data service request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The data service returned a non-2xx status code.
    #[error("data service returned HTTP {0}")]
    HttpStatus(u16),
}

/// Source of collection records for page rendering.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Records of `collection`, optionally narrowed by a data service filter
    /// expression (e.g. `slug="hello"`).
    async fn fetch_collection(
        &self,
        collection: &str,
        filter: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, ContentError>;
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// [`ContentSource`] backed by the data service's record list endpoint:
/// `GET {base}/api/collections/{collection}/records`.
#[derive(Clone)]
pub struct DataServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl DataServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{collection}/records", self.base_url)
    }
}

#[async_trait]
impl ContentSource for DataServiceClient {
    async fn fetch_collection(
        &self,
        collection: &str,
        filter: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, ContentError> {
        let per_page = PER_PAGE.to_string();
        let mut query = vec![("page", "1"), ("perPage", per_page.as_str()), ("sort", DEFAULT_SORT)];
        if let Some(filter) = filter {
            query.push(("filter", filter));
        }

        let response = self
            .client
            .get(self.records_url(collection))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::HttpStatus(status.as_u16()));
        }

        let list: ListResponse = response.json().await?;
        tracing::debug!(collection, count = list.items.len(), "Fetched collection");
        Ok(list.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_url_trims_trailing_slash() {
        let client = DataServiceClient::new("http://127.0.0.1:8090/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.records_url("blogs"),
            "http://127.0.0.1:8090/api/collections/blogs/records"
        );
    }

    #[test]
    fn list_response_tolerates_missing_items() {
        let list: ListResponse = serde_json::from_str(r#"{"page":1}"#).unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn http_status_error_display() {
        assert_eq!(ContentError::HttpStatus(503).to_string(), "data service returned HTTP 503");
    }
}
