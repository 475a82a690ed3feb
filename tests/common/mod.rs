//! In-memory providers shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stocksentiment::external::news_provider::{
    EverythingRequest, EverythingResponse, NewsProvider, NewsProviderError, RawArticle, RawSource,
};
use stocksentiment::external::price_provider::{
    OhlcTable, PriceDownload, PriceProvider, PriceProviderError,
};
use stocksentiment::models::HistoricRequest;
use stocksentiment::services::news_service::NewsFetcher;
use stocksentiment::services::pipeline_service::HistoricPipeline;
use stocksentiment::services::price_service::PriceFetcher;
use stocksentiment::services::sentiment_service::{PolarityScorer, SentimentScorer};
use stocksentiment::services::vader::VaderAnalyzer;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Returns one flat adjusted-close bar per day in `[start, end)` for every ticker.
pub struct FlatPriceProvider {
    pub calls: AtomicUsize,
    pub price: f64,
}

impl FlatPriceProvider {
    pub fn new(price: f64) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            price,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn table(&self, start: NaiveDate, end: NaiveDate) -> OhlcTable {
        let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d < end).collect();
        let n = dates.len();
        OhlcTable {
            dates,
            open: vec![Some(self.price); n],
            high: vec![Some(self.price); n],
            low: vec![Some(self.price); n],
            close: vec![Some(self.price); n],
            adj_close: Some(vec![Some(self.price); n]),
            volume: vec![Some(1_000); n],
        }
    }
}

#[async_trait]
impl PriceProvider for FlatPriceProvider {
    async fn download(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceDownload, PriceProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let [_] = tickers {
            return Ok(PriceDownload::SingleTicker(self.table(start, end)));
        }
        Ok(PriceDownload::MultiTicker(
            tickers
                .iter()
                .map(|t| (t.clone(), self.table(start, end)))
                .collect(),
        ))
    }
}

/// Always fails with a network error.
pub struct DownPriceProvider {
    pub calls: AtomicUsize,
}

impl DownPriceProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PriceProvider for DownPriceProvider {
    async fn download(
        &self,
        _tickers: &[String],
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<PriceDownload, PriceProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PriceProviderError::Network("connection refused".into()))
    }
}

/// Serves a fixed article list as a single `ok` page and records requests.
pub struct StaticNewsProvider {
    pub articles: Vec<RawArticle>,
    pub requests: Mutex<Vec<EverythingRequest>>,
}

impl StaticNewsProvider {
    pub fn new(articles: Vec<RawArticle>) -> Arc<Self> {
        Arc::new(Self {
            articles,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl NewsProvider for StaticNewsProvider {
    async fn get_everything(
        &self,
        request: &EverythingRequest,
    ) -> Result<EverythingResponse, NewsProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(EverythingResponse {
            status: "ok".into(),
            total_results: self.articles.len(),
            articles: self.articles.clone(),
            code: None,
            message: None,
        })
    }
}

pub fn raw_article(published_at: &str, title: &str) -> RawArticle {
    RawArticle {
        source: Some(RawSource {
            id: None,
            name: Some("Wire".into()),
        }),
        title: Some(title.into()),
        published_at: Some(published_at.into()),
        url: Some(format!("https://news.example.com/{}", title.len())),
        ..RawArticle::default()
    }
}

/// Scores by exact title lookup; unknown titles are unscorable.
pub struct TitleScorer {
    pub scores: Vec<(&'static str, f64)>,
}

impl PolarityScorer for TitleScorer {
    fn polarity_scores(&self, text: &str) -> Option<stocksentiment::models::PolarityScores> {
        let title = text.trim_end_matches('.').trim();
        self.scores
            .iter()
            .find(|(t, _)| *t == title)
            .map(|(_, compound)| stocksentiment::models::PolarityScores {
                compound: *compound,
                ..stocksentiment::models::PolarityScores::neutral()
            })
    }
}

pub fn pipeline(
    prices: Arc<dyn PriceProvider>,
    news: Option<Arc<dyn NewsProvider>>,
    scorer: Arc<dyn PolarityScorer>,
) -> HistoricPipeline {
    HistoricPipeline::new(
        PriceFetcher::new(prices),
        NewsFetcher::new(news, "en"),
        SentimentScorer::new(scorer),
    )
}

pub fn vader() -> Arc<dyn PolarityScorer> {
    Arc::new(VaderAnalyzer::new())
}

pub fn request(stocks: &[&str], start: &str, end: &str) -> HistoricRequest {
    HistoricRequest {
        stocks: stocks.iter().map(|s| s.to_string()).collect(),
        start_date: Some(start.to_string()),
        end_date: Some(end.to_string()),
    }
}
