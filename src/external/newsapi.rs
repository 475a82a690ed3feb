use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use crate::external::news_provider::{
    EverythingRequest, EverythingResponse, NewsProvider, NewsProviderError,
};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// NewsAPI.org `/v2/everything` client
pub struct NewsApiProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl NewsApiProvider {
    pub fn new(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NewsProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NewsProviderError::Network(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn get_everything(
        &self,
        request: &EverythingRequest,
    ) -> Result<EverythingResponse, NewsProviderError> {
        debug!(
            "Requesting NewsAPI page {} for query '{}' ({} to {})",
            request.page, request.query, request.from, request.to
        );

        let response = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", request.query.clone()),
                ("from", request.from.to_string()),
                ("to", request.to.to_string()),
                ("language", request.language.clone()),
                ("sortBy", request.sort_by.as_str().to_string()),
                ("pageSize", request.page_size.to_string()),
                ("page", request.page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("NewsAPI request failed: {}", e);
                NewsProviderError::Network(e.to_string())
            })?;

        // error pages still carry the JSON envelope, with status "error"
        let status = response.status();
        response.json::<EverythingResponse>().await.map_err(|e| {
            error!("Failed to parse NewsAPI response (HTTP {}): {}", status, e);
            NewsProviderError::Parse(e.to_string())
        })
    }
}
