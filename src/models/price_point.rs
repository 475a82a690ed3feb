use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::InputError;

pub const MAX_TICKERS: usize = 5;

/// Calendar date format accepted from the dashboard form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Uppercase, de-duplicated ticker selection of 1..=5 symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerSet(Vec<String>);

impl TickerSet {
    pub fn parse<I, S>(raw: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tickers: Vec<String> = Vec::new();
        for symbol in raw {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if !symbol.is_empty() && !tickers.contains(&symbol) {
                tickers.push(symbol);
            }
        }

        if tickers.is_empty() {
            return Err(InputError::NoTickers);
        }
        if tickers.len() > MAX_TICKERS {
            return Err(InputError::TooManyTickers {
                max: MAX_TICKERS,
                requested: tickers.len(),
            });
        }

        Ok(Self(tickers))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Disjunctive keyword query, e.g. `AAPL OR TSLA`.
    pub fn keyword_query(&self) -> String {
        self.0.join(" OR ")
    }
}

/// Inclusive calendar range with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InputError> {
        if start >= end {
            return Err(InputError::StartNotBeforeEnd);
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, InputError> {
        let start = parse_date(start, "start_date")?;
        let end = parse_date(end, "end_date")?;
        Self::new(start, end)
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

fn parse_date(raw: Option<&str>, field: &str) -> Result<NaiveDate, InputError> {
    let raw = raw.ok_or_else(|| InputError::InvalidDate(format!("{} is required", field)))?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| InputError::InvalidDate(format!("{} '{}': {}", field, raw, e)))
}

/// One adjusted-close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: f64,
}

/// Adjusted-close history keyed by ticker. Every ticker shares the same
/// ascending, gap-free date index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    series: BTreeMap<String, Vec<PricePoint>>,
}

impl PriceSeries {
    pub fn new(series: BTreeMap<String, Vec<PricePoint>>) -> Self {
        Self { series }
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn get(&self, ticker: &str) -> Option<&[PricePoint]> {
        self.series.get(ticker).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PricePoint])> {
        self.series.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }
}
