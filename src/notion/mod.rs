pub mod types;

pub use types::Page;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::extract::PageReference;
use types::{ApiErrorBody, QueryResponse};

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// API version pinned for every request; property value shapes below are
/// written against it.
const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("Notion API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Minimal Notion REST client covering the four operations this tool
/// consumes: query a database, create a page, update a page, comment on
/// a page. No retries; failures carry the service's own error message.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (tests point this at a local server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Query a database with the given filter, returning the matching pages.
    pub async fn query_database(
        &self,
        database_id: &str,
        filter: Value,
    ) -> Result<Vec<Page>, NotionError> {
        debug!(%database_id, "querying Notion database");
        let response = self
            .http
            .post(format!("{}/databases/{}/query", self.base_url, database_id))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({ "filter": filter }))
            .send()
            .await?;
        let body: QueryResponse = Self::decode(response).await?;
        debug!(matches = body.results.len(), "query returned");
        Ok(body.results)
    }

    /// Create a page in a database with the given property map.
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Value,
    ) -> Result<Page, NotionError> {
        debug!(%database_id, "creating Notion page");
        let response = self
            .http
            .post(format!("{}/pages", self.base_url))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({
                "parent": { "database_id": database_id },
                "properties": properties,
            }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Patch a page's properties; properties absent from the map keep their
    /// current value.
    pub async fn update_page(
        &self,
        page_id: &str,
        properties: Value,
    ) -> Result<Page, NotionError> {
        debug!(%page_id, "updating Notion page");
        let response = self
            .http
            .patch(format!("{}/pages/{}", self.base_url, page_id))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({ "properties": properties }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Append a comment with the given rich text to a page.
    pub async fn create_comment(
        &self,
        page: &PageReference,
        rich_text: Value,
    ) -> Result<(), NotionError> {
        debug!(page = %page, "commenting on Notion page");
        let response = self
            .http
            .post(format!("{}/comments", self.base_url))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({
                "parent": { "page_id": page.as_str() },
                "rich_text": rich_text,
            }))
            .send()
            .await?;
        Self::check(response).await
    }

    /// Decode a JSON response, turning non-2xx statuses into Api errors
    /// carrying the body's message.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, NotionError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status, response).await);
        }
        Ok(response.json::<T>().await?)
    }

    /// Like decode, for calls whose response body is not consumed.
    async fn check(response: reqwest::Response) -> Result<(), NotionError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status, response).await);
        }
        Ok(())
    }

    async fn api_error(status: StatusCode, response: reqwest::Response) -> NotionError {
        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| "no error detail".to_string());
        NotionError::Api { status, message }
    }
}
