mod chart;
mod historic;
mod news;
mod price_point;
mod sentiment;

pub use chart::{Figure, Trace, TraceMode};
pub use historic::{
    HistoricContext, HistoricRequest, PipelineOutput, PipelineStage, TARGET_STOCKS,
};
pub use news::{Article, SentimentLabel};
pub use price_point::{DateRange, PricePoint, PriceSeries, TickerSet, DATE_FORMAT, MAX_TICKERS};
pub use sentiment::{
    Frequency, PolarityScores, RollingPoint, SentimentPoint, SentimentSeries,
};
