use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

/// Daily OHLC table for one ticker, column-oriented and indexed by `dates`.
///
/// `adj_close` is `None` when the provider did not return the column at all,
/// which is distinct from a column whose values are all missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcTable {
    pub dates: Vec<NaiveDate>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub adj_close: Option<Vec<Option<f64>>>,
    pub volume: Vec<Option<u64>>,
}

impl OhlcTable {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }
}

/// Shape of a provider download. A single requested ticker comes back
/// without a ticker axis; several tickers come back keyed by symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceDownload {
    SingleTicker(OhlcTable),
    MultiTicker(BTreeMap<String, OhlcTable>),
}

impl PriceDownload {
    /// Collapse both layouts into one ticker-keyed mapping. A single-ticker
    /// table is named after the first requested ticker.
    pub fn into_mapping(self, requested: &[String]) -> BTreeMap<String, OhlcTable> {
        match self {
            PriceDownload::SingleTicker(table) => {
                let mut mapping = BTreeMap::new();
                if let Some(ticker) = requested.first() {
                    mapping.insert(ticker.clone(), table);
                }
                mapping
            }
            PriceDownload::MultiTicker(mapping) => mapping,
        }
    }
}

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("ticker not found: {0}")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily bars for `tickers` from `start` (inclusive) to `end` (exclusive).
    async fn download(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceDownload, PriceProviderError>;
}
