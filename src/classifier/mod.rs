//! Sentiment classification seam.
//!
//! The analysis service and the explanation generator only depend on the
//! [`SentimentClassifier`] trait, so the shipped lexicon scorer can be
//! swapped for a remote model client (or a stub in tests) without touching
//! either of them.

mod lexicon;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use lexicon::LexiconClassifier;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),
}

/// The two classes the service predicts, serialized in the wire format the
/// UI expects ("POSITIVE"/"NEGATIVE").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negative => "NEGATIVE",
            Self::Positive => "POSITIVE",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a class distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    pub label: Sentiment,
    pub score: f64,
}

/// Text-classification capability: maps text to a probability distribution
/// over both classes (scores summing to ~1.0).
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Vec<ClassScore>, ClassifierError>;

    /// Batch form used by the explanation generator for its perturbation
    /// queries. The default maps [`Self::classify`] over the inputs.
    fn classify_batch(&self, texts: &[String]) -> Result<Vec<Vec<ClassScore>>, ClassifierError> {
        texts.iter().map(|t| self.classify(t)).collect()
    }
}

/// Collapse a distribution into `[p_negative, p_positive]`, sorted by label
/// name. The explainer relies on this ordering matching its configured class
/// names (index 0 = NEGATIVE, index 1 = POSITIVE); a mismatch would mislabel
/// every attribution.
#[must_use]
pub fn class_probabilities(scores: &[ClassScore]) -> [f64; 2] {
    let mut probs = [0.0, 0.0];
    for entry in scores {
        match entry.label {
            Sentiment::Negative => probs[0] = entry.score,
            Sentiment::Positive => probs[1] = entry.score,
        }
    }
    probs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_probabilities_order_is_label_sorted() {
        let scores = vec![
            ClassScore {
                label: Sentiment::Positive,
                score: 0.9,
            },
            ClassScore {
                label: Sentiment::Negative,
                score: 0.1,
            },
        ];

        let probs = class_probabilities(&scores);
        assert!((probs[0] - 0.1).abs() < 1e-12);
        assert!((probs[1] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_sentiment_wire_format() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Positive).unwrap(),
            "\"POSITIVE\""
        );
        assert_eq!(Sentiment::Negative.to_string(), "NEGATIVE");
    }
}
