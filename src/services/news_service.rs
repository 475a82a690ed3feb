use std::sync::Arc;
use tracing::{error, info, warn};

use crate::external::news_provider::{
    EverythingRequest, NewsProvider, RawArticle, SortBy, MAX_PAGE_SIZE,
};
use crate::models::{Article, DateRange, TickerSet};

/// Upper bound on articles collected for one request.
pub const MAX_ARTICLES: usize = 500;

/// Paginates the news provider for articles mentioning a ticker selection.
///
/// Never fails: missing credentials, provider errors and transport errors all
/// degrade to whatever was collected before the failure.
#[derive(Clone)]
pub struct NewsFetcher {
    provider: Option<Arc<dyn NewsProvider>>,
    language: String,
}

impl NewsFetcher {
    pub fn new(provider: Option<Arc<dyn NewsProvider>>, language: impl Into<String>) -> Self {
        if provider.is_none() {
            warn!("News fetcher created without a provider; headlines will be empty");
        }
        Self {
            provider,
            language: language.into(),
        }
    }

    pub async fn fetch(&self, tickers: &TickerSet, window: &DateRange, cap: usize) -> Vec<Article> {
        let Some(provider) = self.provider.as_ref() else {
            error!("NewsAPI key not found in settings.");
            return Vec::new();
        };

        let mut request = EverythingRequest {
            query: tickers.keyword_query(),
            from: window.start,
            to: window.end,
            language: self.language.clone(),
            sort_by: SortBy::PublishedAt,
            page_size: MAX_PAGE_SIZE,
            page: 1,
        };

        let mut collected: Vec<RawArticle> = Vec::new();
        let mut total_results = 1;
        let mut fetched = 0;

        while fetched < total_results && fetched < cap {
            let response = match provider.get_everything(&request).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Error fetching news headlines for {}: {}", request.query, e);
                    break;
                }
            };

            if !response.is_ok() {
                error!(
                    "NewsAPI error (Code: {}): {}",
                    response.code.as_deref().unwrap_or("unknown"),
                    response.message.as_deref().unwrap_or("")
                );
                if response.is_lookback_exceeded() {
                    warn!(
                        "NewsAPI lookback limit likely exceeded. Requested {} days back from {}.",
                        window.days(),
                        window.end
                    );
                }
                break;
            }

            let page_len = response.articles.len();
            total_results = response.total_results;
            fetched += page_len;
            collected.extend(response.articles);

            if page_len == 0 || fetched >= total_results {
                break;
            }
            request.page += 1;
        }

        collected.truncate(cap);
        info!(
            "Fetched {} articles for '{}' over {} pages",
            collected.len(),
            request.query,
            request.page
        );

        collected.into_iter().map(normalize_article).collect()
    }
}

/// Keep the five display fields and drop provider extras.
fn normalize_article(raw: RawArticle) -> Article {
    Article {
        published_at: raw.published_at,
        title: raw.title,
        description: raw.description,
        source: raw.source.and_then(|s| s.name),
        url: raw.url,
        sentiment: None,
        sentiment_label: None,
    }
}
