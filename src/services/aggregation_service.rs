use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{Article, Frequency, RollingPoint, SentimentPoint, SentimentSeries};

/// Window of the rolling mean drawn over daily sentiment.
pub const ROLLING_WINDOW: usize = 7;

/// Resamples scored articles into a dense time series
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentAggregator;

impl SentimentAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Mean `sentiment` per bucket, with empty buckets between the first and
    /// last observation filled with 0.0. Articles lacking a parseable
    /// timestamp or a sentiment score are ignored.
    pub fn aggregate(&self, articles: &[Article], frequency: Frequency) -> SentimentSeries {
        let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        let mut dropped = 0;

        for article in articles {
            let published = article.published_at.as_deref().and_then(parse_published_at);
            let (Some(published), Some(sentiment)) = (published, article.sentiment) else {
                dropped += 1;
                continue;
            };
            let entry = buckets
                .entry(bucket_of(published.date_naive(), frequency))
                .or_insert((0.0, 0));
            entry.0 += sentiment;
            entry.1 += 1;
        }

        if dropped > 0 {
            debug!("Ignored {} articles without timestamp or sentiment", dropped);
        }

        let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back())
        else {
            return SentimentSeries::default();
        };

        let mut points = Vec::new();
        let mut bucket = first;
        while bucket <= last {
            let score = buckets
                .get(&bucket)
                .map(|(sum, count)| sum / *count as f64)
                .unwrap_or(0.0);
            points.push(SentimentPoint { date: bucket, score });
            bucket = next_bucket(bucket, frequency);
        }

        SentimentSeries::new(points)
    }
}

/// Trailing mean over `window` points. Entries before the window fills are `None`.
pub fn rolling_mean(series: &SentimentSeries, window: usize) -> Vec<RollingPoint> {
    let points = series.points();
    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = (window > 0 && i + 1 >= window).then(|| {
                points[i + 1 - window..=i].iter().map(|p| p.score).sum::<f64>() / window as f64
            });
            RollingPoint {
                date: point.date,
                value,
            }
        })
        .collect()
}

/// Accepts RFC 3339 (what NewsAPI emits), naive date-times and bare dates.
/// Naive values are taken as UTC.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn bucket_of(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Day => date,
        Frequency::Week => {
            let to_sunday = 6 - date.weekday().num_days_from_monday();
            date + Duration::days(to_sunday as i64)
        }
        Frequency::Month => month_end(date.year(), date.month()),
    }
}

fn next_bucket(bucket: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Day => bucket + Duration::days(1),
        Frequency::Week => bucket + Duration::days(7),
        Frequency::Month => {
            let first_of_next = bucket + Duration::days(1);
            month_end(first_of_next.year(), first_of_next.month())
        }
    }
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
