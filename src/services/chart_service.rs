use crate::models::{
    DateRange, Figure, PriceSeries, RollingPoint, SentimentSeries, Trace, TraceMode, DATE_FORMAT,
};

/// Adjusted close prices, one line per ticker.
pub fn price_figure(prices: &PriceSeries, range: &DateRange) -> Figure {
    let traces = prices
        .iter()
        .map(|(ticker, points)| Trace {
            name: ticker.to_string(),
            mode: TraceMode::Lines,
            x: points.iter().map(|p| p.date).collect(),
            y: points.iter().map(|p| Some(p.adj_close)).collect(),
        })
        .collect();

    Figure {
        title: format!(
            "Historical Adjusted Close Prices ({} to {})",
            range.start.format(DATE_FORMAT),
            range.end.format(DATE_FORMAT)
        ),
        xaxis_title: "Date".to_string(),
        yaxis_title: "Price (USD)".to_string(),
        legend_title: Some("Tickers".to_string()),
        traces,
    }
}

/// Daily mean sentiment, plus the rolling average when one was computed.
pub fn sentiment_figure(series: &SentimentSeries, rolling: Option<&[RollingPoint]>) -> Figure {
    let mut traces = vec![Trace {
        name: "Avg Daily Sentiment".to_string(),
        mode: TraceMode::LinesMarkers,
        x: series.points().iter().map(|p| p.date).collect(),
        y: series.points().iter().map(|p| Some(p.score)).collect(),
    }];

    if let Some(rolling) = rolling {
        traces.push(Trace {
            name: "7-Day Rolling Avg".to_string(),
            mode: TraceMode::Lines,
            x: rolling.iter().map(|p| p.date).collect(),
            y: rolling.iter().map(|p| p.value).collect(),
        });
    }

    Figure {
        title: "Average Daily News Sentiment (VADER Compound Score)".to_string(),
        xaxis_title: "Date".to_string(),
        yaxis_title: "Avg. Sentiment Score".to_string(),
        legend_title: None,
        traces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PricePoint, SentimentPoint};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_price_figure_has_trace_per_ticker() {
        let mut series = BTreeMap::new();
        series.insert(
            "AAPL".to_string(),
            vec![
                PricePoint { date: d(2), adj_close: 185.6 },
                PricePoint { date: d(3), adj_close: 184.2 },
            ],
        );
        series.insert(
            "TSLA".to_string(),
            vec![
                PricePoint { date: d(2), adj_close: 248.4 },
                PricePoint { date: d(3), adj_close: 238.4 },
            ],
        );
        let range = DateRange::new(d(1), d(10)).unwrap();

        let figure = price_figure(&PriceSeries::new(series), &range);

        assert_eq!(figure.title, "Historical Adjusted Close Prices (2024-01-01 to 2024-01-10)");
        assert_eq!(figure.yaxis_title, "Price (USD)");
        assert_eq!(figure.legend_title.as_deref(), Some("Tickers"));
        let names: Vec<_> = figure.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["AAPL", "TSLA"]);
        assert!(figure.traces.iter().all(|t| t.mode == TraceMode::Lines));
        assert_eq!(figure.traces[1].y, vec![Some(248.4), Some(238.4)]);
    }

    #[test]
    fn test_sentiment_figure_without_rolling() {
        let series = SentimentSeries::new(vec![SentimentPoint { date: d(2), score: 0.25 }]);
        let figure = sentiment_figure(&series, None);

        assert_eq!(figure.traces.len(), 1);
        assert_eq!(figure.traces[0].name, "Avg Daily Sentiment");
        assert_eq!(figure.traces[0].mode, TraceMode::LinesMarkers);
        assert!(figure.legend_title.is_none());
    }

    #[test]
    fn test_sentiment_figure_with_rolling_keeps_gaps() {
        let series = SentimentSeries::new(vec![
            SentimentPoint { date: d(1), score: 0.1 },
            SentimentPoint { date: d(2), score: 0.2 },
        ]);
        let rolling = vec![
            RollingPoint { date: d(1), value: None },
            RollingPoint { date: d(2), value: Some(0.15) },
        ];

        let figure = sentiment_figure(&series, Some(&rolling));

        assert_eq!(figure.traces.len(), 2);
        assert_eq!(figure.traces[1].name, "7-Day Rolling Avg");
        assert_eq!(figure.traces[1].y, vec![None, Some(0.15)]);
    }

    #[test]
    fn test_figure_serializes_plotly_modes() {
        let series = SentimentSeries::new(vec![SentimentPoint { date: d(2), score: 0.0 }]);
        let json = serde_json::to_value(sentiment_figure(&series, None)).unwrap();
        assert_eq!(json["traces"][0]["mode"], "lines+markers");
        assert_eq!(json["traces"][0]["x"][0], "2024-01-02");
    }
}
