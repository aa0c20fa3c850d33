use thiserror::Error;
use url::Url;

use crate::models::{SearchRequest, SearchResponse};

/// Thin client for the Meilisearch HTTP API.
///
/// Only the search endpoint is wrapped; index maintenance is handled by the
/// indexing pipeline, not by this service.
#[derive(Clone)]
pub struct MeiliClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl MeiliClient {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Search an index. Hits come back best match first, at most `limit` of them.
    #[tracing::instrument(skip(self, request))]
    pub async fn search(
        &self,
        index_uid: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, MeiliError> {
        let url = self
            .base_url
            .join(&format!("indexes/{index_uid}/search"))
            .map_err(|e| MeiliError::Other(e.to_string()))?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| MeiliError::ResponseError(e.to_string()))?;

        if resp.status() == 401 || resp.status() == 403 {
            return Err(MeiliError::Unauthorized);
        }
        if !resp.status().is_success() {
            return Err(MeiliError::ResponseError(format!(
                "unexpected status {}",
                resp.status()
            )));
        }

        let response = resp.json::<SearchResponse>().await.map_err(|e| {
            MeiliError::ParsingError(format!("failed to parse response as JSON: {e}"))
        })?;
        tracing::debug!(hits = response.hits.len(), "search completed");

        Ok(response)
    }
}

impl std::fmt::Debug for MeiliClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeiliClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum MeiliError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
    #[error("Other: {0}")]
    Other(String),
}
