use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Provider-side cap on `pageSize`.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
        }
    }
}

/// Parameters of one `/everything` page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EverythingRequest {
    pub query: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub language: String,
    pub sort_by: SortBy,
    pub page_size: u32,
    pub page: u32,
}

/// Envelope returned for every page, successful or not.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EverythingResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: usize,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl EverythingResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// The provider refused the window because `from` lies beyond the plan's history.
    pub fn is_lookback_exceeded(&self) -> bool {
        self.code.as_deref() == Some("parameterInvalid")
            && self
                .message
                .as_deref()
                .is_some_and(|m| m.contains("too far in the past"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub source: Option<RawSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum NewsProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Trait for news providers
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn get_everything(
        &self,
        request: &EverythingRequest,
    ) -> Result<EverythingResponse, NewsProviderError>;
}
