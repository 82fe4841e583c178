//! Workspace (Notion) API client: page enumeration and content rendering.
//!
//! This crate provides:
//! - [`NotionClient`]: thin typed wrapper over the two endpoints the exporter needs
//! - [`NotionClient::enumerate_documents`]: walks the paginated search endpoint
//! - [`NotionClient::render_content`]: turns a page's top-level blocks into fragments
//! - [`api`]: wire types decoded at the HTTP boundary

pub mod api;
mod blocks;
mod search;

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use pagesync_shared::{NotionConfig, PageSyncError, Result};

use crate::api::{BlockChildren, SearchRequest, SearchResponse};

pub use blocks::fragments_from_blocks;
pub use search::documents_from_results;

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("pagesync/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// NotionClient
// ---------------------------------------------------------------------------

/// Authenticated client for the workspace API.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: Client,
    config: NotionConfig,
}

impl NotionClient {
    /// Create a new client from resolved configuration.
    pub fn new(config: NotionConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PageSyncError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch one batch of page search results.
    #[instrument(skip(self))]
    pub async fn search_pages(&self, start_cursor: Option<&str>) -> Result<SearchResponse> {
        let url = self.endpoint("v1/search");
        let request = self
            .http
            .post(&url)
            .json(&SearchRequest::pages(start_cursor));

        self.send(request, &url).await
    }

    /// Fetch the first page of a block's immediate children.
    #[instrument(skip(self))]
    pub async fn list_block_children(&self, block_id: &str) -> Result<BlockChildren> {
        let url = self.endpoint(&format!("v1/blocks/{block_id}/children"));
        let request = self.http.get(&url);

        self.send(request, &url).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{path}",
            self.config.api_base.as_str().trim_end_matches('/')
        )
    }

    /// Attach auth headers, send, check the status, and decode the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let response = request
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| PageSyncError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PageSyncError::Network(format!("{url}: failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(PageSyncError::api(status.as_u16(), body));
        }

        debug!(%url, len = body.len(), "response received");

        serde_json::from_str(&body).map_err(|e| PageSyncError::Decode(format!("{url}: {e}")))
    }
}
