use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Article, DateRange, Figure, PriceSeries, RollingPoint, SentimentSeries};

/// Tickers offered on the dashboard
pub const TARGET_STOCKS: [&str; 5] = ["AAPL", "TSLA", "AMZN", "MSFT", "GOOGL"];

/// Request body for the historic view. Dates are `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricRequest {
    #[serde(default)]
    pub stocks: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Lifecycle of one pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Validating,
    Fetching,
    Scoring,
    Aggregating,
    Rendering,
    Done,
    Failed,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Validating => "validating",
            PipelineStage::Fetching => "fetching",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Aggregating => "aggregating",
            PipelineStage::Rendering => "rendering",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Everything one pipeline run produced. Each branch degrades independently,
/// so any field may be absent while the others are populated.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub stage: PipelineStage,
    pub selected_stocks: Vec<String>,
    pub date_range: Option<DateRange>,
    pub price_series: Option<PriceSeries>,
    pub sentiment_series: Option<SentimentSeries>,
    pub rolling_average: Option<Vec<RollingPoint>>,
    pub price_chart: Option<Figure>,
    pub sentiment_chart: Option<Figure>,
    pub news_articles: Vec<Article>,
    pub error: Option<String>,
}

impl PipelineOutput {
    pub fn new(selected_stocks: Vec<String>) -> Self {
        Self {
            stage: PipelineStage::Idle,
            selected_stocks,
            date_range: None,
            price_series: None,
            sentiment_series: None,
            rolling_average: None,
            price_chart: None,
            sentiment_chart: None,
            news_articles: Vec::new(),
            error: None,
        }
    }

    /// Appends a degradation note to the accumulated error text.
    pub fn push_error(&mut self, message: &str) {
        self.error.get_or_insert_with(String::new).push_str(message);
    }
}

/// Context record consumed by the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct HistoricContext {
    pub stocks: Vec<String>,
    pub selected_stocks: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_chart: Option<Figure>,
    pub sentiment_chart: Option<Figure>,
    pub news_articles: Vec<Article>,
    pub error: Option<String>,
}

impl HistoricContext {
    /// Initial view: the last three years, nothing selected.
    pub fn with_defaults(today: NaiveDate) -> Self {
        Self {
            stocks: TARGET_STOCKS.iter().map(|s| s.to_string()).collect(),
            selected_stocks: Vec::new(),
            start_date: today - Duration::days(3 * 365),
            end_date: today,
            price_chart: None,
            sentiment_chart: None,
            news_articles: Vec::new(),
            error: None,
        }
    }

    pub fn from_output(output: PipelineOutput, today: NaiveDate) -> Self {
        let mut context = Self::with_defaults(today);
        if let Some(range) = output.date_range {
            context.start_date = range.start;
            context.end_date = range.end;
        }
        context.selected_stocks = output.selected_stocks;
        context.price_chart = output.price_chart;
        context.sentiment_chart = output.sentiment_chart;
        context.news_articles = output.news_articles;
        context.error = output.error;
        context
    }
}
