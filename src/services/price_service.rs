use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::external::price_provider::{OhlcTable, PriceProvider, PriceProviderError};
use crate::models::{DateRange, PricePoint, PriceSeries, TickerSet};

#[derive(Debug, Error)]
pub enum PriceFetchError {
    #[error("no adjusted-close data returned")]
    NoData,

    #[error(transparent)]
    Provider(#[from] PriceProviderError),
}

/// Pulls daily bars from the price provider and reduces them to a clean
/// adjusted-close series per ticker.
#[derive(Clone)]
pub struct PriceFetcher {
    provider: Arc<dyn PriceProvider>,
}

impl PriceFetcher {
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(
        &self,
        tickers: &TickerSet,
        range: &DateRange,
    ) -> Result<PriceSeries, PriceFetchError> {
        let download = self
            .provider
            .download(tickers.as_slice(), range.start, range.end)
            .await
            .map_err(|e| {
                error!("Error fetching historical data for {:?}: {}", tickers.as_slice(), e);
                PriceFetchError::from(e)
            })?;

        let tables = download.into_mapping(tickers.as_slice());
        let series = extract_adjusted_close(tables).map_err(|e| {
            warn!(
                "No adjusted-close data for {:?} between {} and {}",
                tickers.as_slice(),
                range.start,
                range.end
            );
            e
        })?;

        info!(
            "Fetched adjusted close for {} of {} tickers",
            series.len(),
            tickers.len()
        );
        Ok(series)
    }
}

/// Select the adjusted-close column of every table onto a shared date index,
/// drop all-missing tickers, then forward-fill and back-fill.
pub fn extract_adjusted_close(
    tables: BTreeMap<String, OhlcTable>,
) -> Result<PriceSeries, PriceFetchError> {
    if tables.values().all(OhlcTable::is_empty) {
        return Err(PriceFetchError::NoData);
    }
    if tables.values().all(|t| t.adj_close.is_none()) {
        error!("'Adj Close' column not found in downloaded data");
        return Err(PriceFetchError::NoData);
    }

    let mut columns: BTreeMap<String, BTreeMap<_, Option<f64>>> = BTreeMap::new();
    for (ticker, table) in tables {
        let Some(adj_close) = table.adj_close else {
            warn!("'Adj Close' column missing for {}, dropping it", ticker);
            continue;
        };
        // later rows win on duplicate dates
        let by_date = table.dates.into_iter().zip(adj_close).collect();
        columns.insert(ticker, by_date);
    }

    let index: BTreeSet<_> = columns.values().flat_map(|c| c.keys().copied()).collect();

    let mut series = BTreeMap::new();
    for (ticker, by_date) in columns {
        let mut values: Vec<Option<f64>> = index
            .iter()
            .map(|date| by_date.get(date).copied().flatten())
            .collect();

        if values.iter().all(Option::is_none) {
            warn!("Dropping {}: adjusted close is entirely missing", ticker);
            continue;
        }

        forward_fill(&mut values);
        back_fill(&mut values);

        let points = index
            .iter()
            .zip(values)
            .filter_map(|(date, value)| {
                value.map(|adj_close| PricePoint {
                    date: *date,
                    adj_close,
                })
            })
            .collect();
        series.insert(ticker, points);
    }

    if series.is_empty() {
        return Err(PriceFetchError::NoData);
    }

    Ok(PriceSeries::new(series))
}

fn forward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for value in values.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => *value = last,
        }
    }
}

fn back_fill(values: &mut [Option<f64>]) {
    let mut next = None;
    for value in values.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => *value = next,
        }
    }
}
