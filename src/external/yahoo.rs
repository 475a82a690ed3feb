use crate::external::price_provider::{OhlcTable, PriceDownload, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PriceProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; stocksentiment/0.1)")
            .build()
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_table(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<OhlcTable, PriceProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let period1 = unix_midnight(start);
        let period2 = unix_midnight(end);

        let resp = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::NotFound(ticker.to_string()));
        }

        let body = resp
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        if let Some(err) = body.chart.error {
            return Err(PriceProviderError::BadResponse(err.to_string()));
        }

        let result = body
            .chart
            .result
            .and_then(|mut r| r.pop())
            .ok_or_else(|| PriceProviderError::BadResponse("missing result".into()))?;

        parse_chart_result(result)
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    meta: YahooMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct YahooMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuote>,
    adjclose: Option<Vec<YahooAdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn column<T: Copy>(values: &[Option<T>], idx: usize) -> Option<T> {
    values.get(idx).copied().flatten()
}

fn parse_chart_result(result: YahooResult) -> Result<OhlcTable, PriceProviderError> {
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adj_column = result
        .indicators
        .adjclose
        .and_then(|mut a| if a.is_empty() { None } else { Some(a.remove(0).adjclose) });

    let mut table = OhlcTable {
        adj_close: adj_column.as_ref().map(|_| Vec::new()),
        ..OhlcTable::default()
    };

    // timestamps align with every indicator list by index
    for (i, ts) in result.timestamp.iter().enumerate() {
        let dt = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
            .ok_or_else(|| PriceProviderError::Parse(format!("bad timestamp {}", ts)))?;

        table.dates.push(dt.date_naive());
        table.open.push(column(&quote.open, i));
        table.high.push(column(&quote.high, i));
        table.low.push(column(&quote.low, i));
        table.close.push(column(&quote.close, i));
        table.volume.push(column(&quote.volume, i));
        if let (Some(out), Some(values)) = (table.adj_close.as_mut(), adj_column.as_ref()) {
            out.push(column(values, i));
        }
    }

    Ok(table)
}

#[async_trait]
impl PriceProvider for YahooProvider {
    async fn download(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceDownload, PriceProviderError> {
        if let [ticker] = tickers {
            let table = self.fetch_table(ticker, start, end).await?;
            info!("Downloaded {} daily bars for {}", table.len(), ticker);
            return Ok(PriceDownload::SingleTicker(table));
        }

        let mut mapping = BTreeMap::new();
        let mut last_error = None;

        // one chart request per ticker, sequentially
        for ticker in tickers {
            match self.fetch_table(ticker, start, end).await {
                Ok(table) => {
                    info!("Downloaded {} daily bars for {}", table.len(), ticker);
                    mapping.insert(ticker.clone(), table);
                }
                Err(e) => {
                    warn!("Failed to download prices for {}: {}", ticker, e);
                    last_error = Some(e);
                }
            }
        }

        match (mapping.is_empty(), last_error) {
            (true, Some(e)) => Err(e),
            _ => Ok(PriceDownload::MultiTicker(mapping)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_result_aligns_columns() {
        let raw = serde_json::json!({
            "meta": { "gmtoffset": -18000 },
            "timestamp": [1704205800, 1704292200],
            "indicators": {
                "quote": [{
                    "open": [187.15, 184.22],
                    "high": [188.44, 185.88],
                    "low": [183.89, 183.43],
                    "close": [185.64, 184.25],
                    "volume": [82488700, 58414500]
                }],
                "adjclose": [{ "adjclose": [184.73, null] }]
            }
        });
        let result: YahooResult = serde_json::from_value(raw).unwrap();
        let table = parse_chart_result(result).unwrap();

        assert_eq!(table.dates[0], NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(table.dates[1], NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(table.adj_close, Some(vec![Some(184.73), None]));
        assert_eq!(table.volume[1], Some(58414500));
    }

    #[test]
    fn test_parse_chart_result_without_adjclose_column() {
        let raw = serde_json::json!({
            "timestamp": [1704205800],
            "indicators": { "quote": [{ "close": [185.64] }] }
        });
        let result: YahooResult = serde_json::from_value(raw).unwrap();
        let table = parse_chart_result(result).unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.adj_close.is_none());
    }
}
