//! VADER polarity scoring backed by the `vader_sentiment` port of the
//! reference analyzer, which ships the full published lexicon and emoji table.
//!
//! Only the score map is adapted here; tokenization, boosters, negation,
//! idioms and punctuation emphasis are the port's.

use tracing::warn;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::models::PolarityScores;
use crate::services::sentiment_service::PolarityScorer;

/// Immutable after construction, so one instance is shared across requests.
pub struct VaderAnalyzer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderAnalyzer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    /// `None` when the analyzer's score map lacks one of the four polarity keys.
    pub fn score_text(&self, text: &str) -> Option<PolarityScores> {
        let scores = self.analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied();

        match (get("neg"), get("neu"), get("pos"), get("compound")) {
            (Some(neg), Some(neu), Some(pos), Some(compound)) => Some(PolarityScores {
                neg,
                neu,
                pos,
                compound,
            }),
            _ => {
                warn!("VADER returned an incomplete score map: {:?}", scores);
                None
            }
        }
    }
}

impl Default for VaderAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for VaderAnalyzer {
    fn polarity_scores(&self, text: &str) -> Option<PolarityScores> {
        self.score_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(text: &str) -> f64 {
        VaderAnalyzer::new().score_text(text).unwrap().compound
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_matches_reference_compounds() {
        assert_close(compound("The book was good."), 0.4404);
        assert_close(compound("VADER is smart, handsome, and funny."), 0.8316);
        assert_close(compound("VADER is not smart, handsome, nor funny."), -0.7424);
        assert_close(compound("A really bad, horrible book."), -0.8211);
    }

    #[test]
    fn test_matches_reference_proportions() {
        let scores = VaderAnalyzer::new()
            .score_text("VADER is smart, handsome, and funny.")
            .unwrap();
        assert_close(scores.pos, 0.746);
        assert_close(scores.neu, 0.254);
        assert_close(scores.neg, 0.0);
    }

    #[test]
    fn test_full_lexicon_covers_headline_vocabulary() {
        assert!(compound("Investors thrilled by results") > 0.05);
        assert!(compound("Dismal quarter for retailer") < -0.05);
        assert_eq!(compound("Microsoft to hold annual meeting on Tuesday"), 0.0);
    }

    #[test]
    fn test_negation_and_emphasis() {
        assert!(compound("not good") < 0.0);
        assert!(compound("very good") > compound("good"));
        assert!(compound("great results!!!") > compound("great results"));
    }

    #[test]
    fn test_scorer_trait_always_scores_text() {
        let analyzer = VaderAnalyzer::new();
        let scores = PolarityScorer::polarity_scores(&analyzer, "great quarter").unwrap();
        assert!((-1.0..=1.0).contains(&scores.compound));
        assert!((scores.pos + scores.neu + scores.neg - 1.0).abs() < 0.01);
    }
}
