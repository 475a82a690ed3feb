use chrono::Duration;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::errors::InputError;
use crate::models::{
    DateRange, Frequency, HistoricRequest, PipelineOutput, PipelineStage, TickerSet,
};
use crate::services::aggregation_service::{rolling_mean, SentimentAggregator, ROLLING_WINDOW};
use crate::services::chart_service::{price_figure, sentiment_figure};
use crate::services::news_service::{NewsFetcher, MAX_ARTICLES};
use crate::services::price_service::PriceFetcher;
use crate::services::sentiment_service::SentimentScorer;

pub const PRICE_ERROR: &str = "Could not fetch stock price data. ";
pub const SENTIMENT_ERROR: &str = "Could not process sentiment data for the selected range. ";

/// Longest news window the provider's plan serves, in days.
pub const NEWS_LOOKBACK_DAYS: i64 = 28;

/// Articles returned to the presentation layer.
pub const DISPLAY_ARTICLES: usize = 20;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("An unexpected error occurred while processing the data.")]
    Unexpected(String),
}

/// Runs one historic dashboard request end to end: validate, fetch prices and
/// news, score, aggregate, and build charts.
///
/// Never returns an error. Price and news branches degrade independently and
/// their failures accumulate in [`PipelineOutput::error`].
#[derive(Clone)]
pub struct HistoricPipeline {
    price_fetcher: PriceFetcher,
    news_fetcher: NewsFetcher,
    scorer: SentimentScorer,
    aggregator: SentimentAggregator,
}

impl HistoricPipeline {
    pub fn new(price_fetcher: PriceFetcher, news_fetcher: NewsFetcher, scorer: SentimentScorer) -> Self {
        Self {
            price_fetcher,
            news_fetcher,
            scorer,
            aggregator: SentimentAggregator::new(),
        }
    }

    pub async fn run(&self, request: &HistoricRequest) -> PipelineOutput {
        match AssertUnwindSafe(self.execute(request)).catch_unwind().await {
            Ok(output) => output,
            Err(payload) => {
                let detail = panic_message(payload.as_ref());
                error!("Historic pipeline aborted: {}", detail);
                let err = PipelineError::Unexpected(detail);
                let mut output = PipelineOutput::new(request.stocks.clone());
                output.date_range =
                    DateRange::parse(request.start_date.as_deref(), request.end_date.as_deref()).ok();
                output.push_error(&err.to_string());
                output.stage = PipelineStage::Failed;
                output
            }
        }
    }

    async fn execute(&self, request: &HistoricRequest) -> PipelineOutput {
        let mut output = PipelineOutput::new(request.stocks.clone());

        advance(&mut output, PipelineStage::Validating);
        let range = match parse_range(request) {
            Ok(range) => range,
            Err(e) => return reject(output, e),
        };
        // kept even when the ticker selection is rejected below
        output.date_range = Some(range);

        let tickers = match TickerSet::parse(&request.stocks) {
            Ok(tickers) => tickers,
            Err(e) => {
                if matches!(e, InputError::TooManyTickers { .. }) {
                    output.selected_stocks.clear();
                }
                return reject(output, e.into());
            }
        };
        output.selected_stocks = tickers.as_slice().to_vec();

        advance(&mut output, PipelineStage::Fetching);
        let prices = match self.price_fetcher.fetch(&tickers, &range).await {
            Ok(series) => Some(series),
            Err(e) => {
                warn!("Price branch degraded: {}", e);
                output.push_error(PRICE_ERROR);
                None
            }
        };

        let window = news_window(&range);
        let articles = self.news_fetcher.fetch(&tickers, &window, MAX_ARTICLES).await;

        advance(&mut output, PipelineStage::Scoring);
        let articles = self.scorer.score_articles(articles);

        advance(&mut output, PipelineStage::Aggregating);
        let daily = self.aggregator.aggregate(&articles, Frequency::Day);
        let sentiment = if daily.is_empty() {
            warn!("No sentiment could be derived from {} articles", articles.len());
            output.push_error(SENTIMENT_ERROR);
            None
        } else {
            let filtered = daily.within(&range);
            if filtered.is_empty() {
                info!("Sentiment series has no points between {} and {}", range.start, range.end);
                None
            } else {
                Some(filtered)
            }
        };
        let rolling = sentiment
            .as_ref()
            .filter(|s| s.len() >= ROLLING_WINDOW)
            .map(|s| rolling_mean(s, ROLLING_WINDOW));

        advance(&mut output, PipelineStage::Rendering);
        output.price_chart = prices.as_ref().map(|p| price_figure(p, &range));
        output.sentiment_chart = sentiment
            .as_ref()
            .map(|s| sentiment_figure(s, rolling.as_deref()));
        output.price_series = prices;
        output.sentiment_series = sentiment;
        output.rolling_average = rolling;
        output.news_articles = articles.into_iter().take(DISPLAY_ARTICLES).collect();

        advance(&mut output, PipelineStage::Done);
        output
    }
}

/// Dates are checked before tickers, so a bad range is reported ahead of a bad selection.
fn parse_range(request: &HistoricRequest) -> Result<DateRange, PipelineError> {
    Ok(DateRange::parse(request.start_date.as_deref(), request.end_date.as_deref())?)
}

fn reject(mut output: PipelineOutput, err: PipelineError) -> PipelineOutput {
    warn!("Rejected historic request: {}", err);
    output.push_error(&err.to_string());
    advance(&mut output, PipelineStage::Failed);
    output
}

/// News window ending at `range.end`, at most [`NEWS_LOOKBACK_DAYS`] long.
pub fn news_window(range: &DateRange) -> DateRange {
    let lookback = range.days().min(NEWS_LOOKBACK_DAYS).max(1);
    DateRange::new(range.end - Duration::days(lookback), range.end).unwrap_or(*range)
}

fn advance(output: &mut PipelineOutput, stage: PipelineStage) {
    debug!("Historic pipeline {} -> {}", output.stage, stage);
    output.stage = stage;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
