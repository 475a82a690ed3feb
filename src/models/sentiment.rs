use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::DateRange;

/// VADER-style polarity breakdown for one piece of text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64, // -1.0 to +1.0
}

impl PolarityScores {
    pub fn neutral() -> Self {
        Self {
            neg: 0.0,
            neu: 0.0,
            pos: 0.0,
            compound: 0.0,
        }
    }
}

/// Resampling bucket width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Day,
    Week,  // buckets end on Sunday
    Month, // buckets labelled with the last day of the month
}

/// Single point in sentiment time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: NaiveDate,
    pub score: f64,
}

/// Trailing mean; `None` until the window is full.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Dense, ascending sentiment series: one point per bucket in its span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSeries {
    points: Vec<SentimentPoint>,
}

impl SentimentSeries {
    pub fn new(points: Vec<SentimentPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[SentimentPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].score)
    }

    /// Points whose date falls inside the inclusive range.
    pub fn within(&self, range: &DateRange) -> SentimentSeries {
        SentimentSeries {
            points: self
                .points
                .iter()
                .filter(|p| range.contains(p.date))
                .copied()
                .collect(),
        }
    }
}
