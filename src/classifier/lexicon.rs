//! Deterministic lexicon-valence classifier.
//!
//! Sums signed valence weights over tokens, flips the sign after a negator,
//! and squashes the total through a logistic to get a probability for the
//! positive class. Deterministic for a given input, which the integration
//! tests depend on.

use super::{ClassScore, ClassifierError, Sentiment, SentimentClassifier};

/// (token, valence) pairs; positive valence pushes toward POSITIVE.
const VALENCE: &[(&str, f64)] = &[
    ("amazing", 2.5),
    ("awesome", 2.5),
    ("beautiful", 1.8),
    ("best", 2.0),
    ("brilliant", 2.2),
    ("captivating", 1.8),
    ("charming", 1.5),
    ("classic", 1.2),
    ("compelling", 1.6),
    ("delightful", 2.0),
    ("enjoyable", 1.6),
    ("enjoyed", 1.8),
    ("entertaining", 1.5),
    ("excellent", 2.4),
    ("fantastic", 2.4),
    ("favorite", 1.8),
    ("flawless", 2.2),
    ("fun", 1.4),
    ("good", 1.2),
    ("gorgeous", 1.8),
    ("great", 1.8),
    ("gripping", 1.7),
    ("incredible", 2.2),
    ("liked", 1.4),
    ("love", 2.0),
    ("loved", 2.2),
    ("masterpiece", 2.6),
    ("memorable", 1.4),
    ("moving", 1.5),
    ("perfect", 2.4),
    ("powerful", 1.5),
    ("recommend", 1.6),
    ("refreshing", 1.4),
    ("stunning", 2.0),
    ("superb", 2.2),
    ("thrilling", 1.7),
    ("touching", 1.5),
    ("wonderful", 2.2),
    ("abysmal", -2.6),
    ("annoying", -1.6),
    ("awful", -2.4),
    ("bad", -1.2),
    ("bland", -1.4),
    ("boring", -1.8),
    ("cliched", -1.4),
    ("confusing", -1.3),
    ("disappointing", -2.0),
    ("disappointment", -2.0),
    ("dreadful", -2.4),
    ("dull", -1.6),
    ("flat", -1.2),
    ("forgettable", -1.5),
    ("garbage", -2.4),
    ("hate", -2.0),
    ("hated", -2.2),
    ("horrible", -2.4),
    ("lazy", -1.4),
    ("mediocre", -1.5),
    ("mess", -1.6),
    ("painful", -1.7),
    ("pointless", -1.8),
    ("poor", -1.4),
    ("predictable", -1.2),
    ("ridiculous", -1.4),
    ("shallow", -1.3),
    ("slow", -1.0),
    ("terrible", -2.4),
    ("tedious", -1.6),
    ("unwatchable", -2.6),
    ("waste", -2.0),
    ("weak", -1.3),
    ("worst", -2.4),
    ("wooden", -1.4),
];

/// Negators flip the valence of the next scored token.
const NEGATORS: &[&str] = &["not", "no", "never", "nothing", "hardly", "barely"];

/// Intensifiers scale the valence of the next scored token.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("really", 1.5),
    ("absolutely", 1.8),
    ("totally", 1.5),
    ("utterly", 1.8),
    ("so", 1.3),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn valence_of(token: &str) -> Option<f64> {
        VALENCE
            .iter()
            .find(|(word, _)| *word == token)
            .map(|(_, weight)| *weight)
    }

    fn score_text(text: &str) -> f64 {
        let mut total = 0.0;
        let mut negate = false;
        let mut boost = 1.0;

        for raw in text.split_whitespace() {
            let token: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .collect::<String>()
                .to_lowercase();

            if token.is_empty() {
                continue;
            }

            if NEGATORS.contains(&token.as_str()) || token.ends_with("n't") {
                negate = true;
                continue;
            }

            if let Some((_, factor)) = INTENSIFIERS.iter().find(|(word, _)| *word == token) {
                boost *= factor;
                continue;
            }

            if let Some(valence) = Self::valence_of(&token) {
                let signed = if negate { -valence } else { valence };
                total += signed * boost;
            }

            // Modifiers only reach the next scored token.
            negate = false;
            boost = 1.0;
        }

        total
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<Vec<ClassScore>, ClassifierError> {
        let score = Self::score_text(text);
        let p_positive = 1.0 / (1.0 + (-score).exp());

        Ok(vec![
            ClassScore {
                label: Sentiment::Negative,
                score: 1.0 - p_positive,
            },
            ClassScore {
                label: Sentiment::Positive,
                score: p_positive,
            },
        ])
    }
}
