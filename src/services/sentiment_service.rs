use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

use crate::models::{Article, PolarityScores, SentimentLabel};

/// Anything that can turn text into polarity scores. `None` means the text
/// could not be scored, which callers treat differently from a neutral score.
pub trait PolarityScorer: Send + Sync {
    fn polarity_scores(&self, text: &str) -> Option<PolarityScores>;
}

const TEXT_SEPARATOR: &str = ". ";

/// Scores articles with a shared, immutable polarity scorer
#[derive(Clone)]
pub struct SentimentScorer {
    scorer: Arc<dyn PolarityScorer>,
}

impl SentimentScorer {
    pub fn new(scorer: Arc<dyn PolarityScorer>) -> Self {
        Self { scorer }
    }

    pub fn score(&self, text: &str) -> Option<PolarityScores> {
        self.scorer.polarity_scores(text)
    }

    /// Scores a loosely-typed value; anything other than a JSON string is unscorable.
    pub fn score_value(&self, value: &Value) -> Option<PolarityScores> {
        match value {
            Value::String(text) => self.score(text),
            _ => None,
        }
    }

    /// Attach `sentiment` and `sentiment_label` to an article.
    ///
    /// Title and description are joined as `"{title}. {description}"`. Articles
    /// with no usable text, or whose text cannot be scored, come out neutral.
    pub fn score_article(&self, mut article: Article) -> Article {
        let title = article.title.as_deref().unwrap_or_default();
        let description = article.description.as_deref().unwrap_or_default();
        let text = format!("{}{}{}", title, TEXT_SEPARATOR, description);
        let text = text.trim();

        let compound = if text.is_empty() || text == TEXT_SEPARATOR.trim() {
            0.0
        } else {
            match self.score(text) {
                Some(scores) => scores.compound.clamp(-1.0, 1.0),
                None => {
                    warn!("Sentiment scoring failed for '{}', defaulting to neutral", truncate(text, 50));
                    0.0
                }
            }
        };

        article.sentiment = Some(compound);
        article.sentiment_label = Some(SentimentLabel::from_compound(compound));
        article
    }

    pub fn score_articles(&self, articles: Vec<Article>) -> Vec<Article> {
        articles
            .into_iter()
            .map(|article| self.score_article(article))
            .collect()
    }

    /// Scores a JSON batch. A non-array input yields nothing; items that are
    /// not article objects are skipped individually.
    pub fn score_batch(&self, batch: &Value) -> Vec<Article> {
        let Some(items) = batch.as_array() else {
            error!("Invalid input: articles must be a list.");
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                if !item.is_object() {
                    warn!("Skipping non-object item in articles list.");
                    return None;
                }
                match serde_json::from_value::<Article>(item.clone()) {
                    Ok(article) => Some(self.score_article(article)),
                    Err(e) => {
                        warn!("Skipping malformed article: {}", e);
                        None
                    }
                }
            })
            .collect()
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::vader::VaderAnalyzer;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed compound score and counts invocations.
    struct FixedScorer {
        compound: Option<f64>,
        calls: AtomicUsize,
    }

    impl FixedScorer {
        fn new(compound: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                compound,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl PolarityScorer for FixedScorer {
        fn polarity_scores(&self, _text: &str) -> Option<PolarityScores> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.compound.map(|compound| PolarityScores {
                compound,
                ..PolarityScores::neutral()
            })
        }
    }

    fn article(title: Option<&str>, description: Option<&str>) -> Article {
        Article {
            title: title.map(String::from),
            description: description.map(String::from),
            ..Article::default()
        }
    }

    #[test]
    fn test_label_thresholds_are_inclusive() {
        assert_eq!(SentimentLabel::from_compound(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(-0.05), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_compound(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(0.0499), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(-0.0499), SentimentLabel::Neutral);
    }

    #[test]
    fn test_empty_article_is_neutral_without_scoring() {
        let fixed = FixedScorer::new(Some(0.9));
        let scorer = SentimentScorer::new(fixed.clone());

        for a in [
            article(Some(""), Some("")),
            article(None, None),
            article(Some("   "), None),
        ] {
            let scored = scorer.score_article(a);
            assert_eq!(scored.sentiment, Some(0.0));
            assert_eq!(scored.sentiment_label, Some(SentimentLabel::Neutral));
        }
        assert_eq!(fixed.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scorer_failure_defaults_to_neutral() {
        let fixed = FixedScorer::new(None);
        let scorer = SentimentScorer::new(fixed.clone());

        let scored = scorer.score_article(article(Some("Apple beats estimates"), None));
        assert_eq!(scored.sentiment, Some(0.0));
        assert_eq!(scored.sentiment_label, Some(SentimentLabel::Neutral));
        assert_eq!(fixed.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_compound_maps_to_label() {
        let scorer = SentimentScorer::new(FixedScorer::new(Some(-0.3)));
        let scored = scorer.score_article(article(Some("Tesla"), Some("recall")));
        assert_eq!(scored.sentiment, Some(-0.3));
        assert_eq!(scored.sentiment_label, Some(SentimentLabel::Negative));
    }

    #[test]
    fn test_score_value_rejects_non_strings() {
        let scorer = SentimentScorer::new(Arc::new(VaderAnalyzer::new()));
        assert!(scorer.score_value(&json!(42)).is_none());
        assert!(scorer.score_value(&json!(null)).is_none());
        assert!(scorer.score_value(&json!("great news")).is_some());
    }

    #[test]
    fn test_score_batch_rejects_non_list() {
        let scorer = SentimentScorer::new(Arc::new(VaderAnalyzer::new()));
        assert!(scorer.score_batch(&json!({"title": "not a list"})).is_empty());
    }

    #[test]
    fn test_score_batch_skips_non_records() {
        let scorer = SentimentScorer::new(Arc::new(VaderAnalyzer::new()));
        let batch = json!([
            {"title": "Great quarter", "description": "Profits look good", "publishedAt": "2024-01-02T10:00:00Z"},
            "just a string",
            7,
            {"title": null, "description": null}
        ]);

        let scored = scorer.score_batch(&batch);
        assert_eq!(scored.len(), 2);
        assert!(scored.iter().all(Article::is_scored));
        assert_eq!(scored[0].sentiment_label, Some(SentimentLabel::Positive));
        assert_eq!(scored[1].sentiment, Some(0.0));
    }
}
