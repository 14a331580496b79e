//! Local-surrogate explanation of a single classification.
//!
//! Perturb-and-refit: mask random subsets of the input's distinct tokens,
//! classify every variant, then fit a weighted ridge model mapping token
//! presence to the positive-class probability. The top coefficients by
//! magnitude become the attribution, rendered as an HTML fragment.
//!
//! The artifact covers exactly one class label, taken from whatever the
//! local fit produced (defaulting to class index 0 when the fit is empty).
//! That is not necessarily the class the service predicted for the input,
//! and callers must not assume it is.

mod ridge;

use ndarray::{Array1, Array2};
use rand::seq::index::sample;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::classifier::{ClassifierError, Sentiment, SentimentClassifier, class_probabilities};

pub use ridge::{RidgeError, RidgeFit, fit_weighted};

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word regex is valid"));

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Surrogate fit failed: {0}")]
    Surrogate(#[from] RidgeError),
}

/// One attributed token with its fitted coefficient. Positive weights push
/// toward POSITIVE (class index 1), negative toward NEGATIVE.
#[derive(Debug, Clone)]
pub struct TokenWeight {
    pub token: String,
    pub weight: f64,
}

/// The inspectable artifact returned to the client.
#[derive(Debug, Clone)]
pub struct Explanation {
    pub label: Sentiment,
    pub features: Vec<TokenWeight>,
    pub html: String,
}

pub struct ExplanationGenerator {
    num_samples: usize,
    num_features: usize,
    kernel_width: f64,
    alpha: f64,
}

impl Default for ExplanationGenerator {
    fn default() -> Self {
        Self::new(100, 10, 0.75)
    }
}

impl ExplanationGenerator {
    #[must_use]
    pub const fn new(num_samples: usize, num_features: usize, kernel_width: f64) -> Self {
        Self {
            num_samples,
            num_features,
            kernel_width,
            alpha: 1.0,
        }
    }

    /// Explain one input. Returns `Ok(None)` when the text has no usable
    /// tokens; the generator never fails on degenerate input.
    pub fn explain(
        &self,
        text: &str,
        classifier: &dyn SentimentClassifier,
    ) -> Result<Option<Explanation>, ExplainError> {
        let (tokens, vocab) = tokenize(text);
        let n_features = vocab.len();
        if n_features == 0 {
            return Ok(None);
        }

        let mut rng = rand::rng();

        // Row 0 is the unperturbed input; every other row masks a random
        // non-empty subset of the vocabulary.
        let mut masks: Vec<Vec<bool>> = Vec::with_capacity(self.num_samples);
        masks.push(vec![true; n_features]);
        for _ in 1..self.num_samples {
            let mut mask = vec![true; n_features];
            let k = rand::Rng::random_range(&mut rng, 1..=n_features);
            for idx in sample(&mut rng, n_features, k) {
                mask[idx] = false;
            }
            masks.push(mask);
        }

        let variants: Vec<String> = masks
            .iter()
            .map(|mask| render_variant(&tokens, mask))
            .collect();

        let distributions = classifier.classify_batch(&variants)?;

        let mut x = Array2::<f64>::zeros((masks.len(), n_features));
        let mut y = Array1::<f64>::zeros(masks.len());
        let mut weights = Array1::<f64>::zeros(masks.len());

        for (i, mask) in masks.iter().enumerate() {
            let mut active = 0usize;
            for (j, &on) in mask.iter().enumerate() {
                if on {
                    x[[i, j]] = 1.0;
                    active += 1;
                }
            }

            // Exponential kernel on the fraction of tokens removed: samples
            // close to the original input dominate the fit.
            let distance = 1.0 - (active as f64 / n_features as f64);
            weights[i] = (-(distance * distance) / (self.kernel_width * self.kernel_width)).exp();

            y[i] = class_probabilities(&distributions[i])[1];
        }

        let fit = fit_weighted(&x, &y, &weights, self.alpha)?;

        let mut ranked: Vec<TokenWeight> = vocab
            .iter()
            .zip(fit.coefficients.iter())
            .map(|(entry, &weight)| TokenWeight {
                token: entry.surface.clone(),
                weight,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.weight
                .abs()
                .partial_cmp(&a.weight.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(self.num_features);

        // The fit targets the positive-class probability, so the artifact is
        // scoped to class index 1 unless the fit came back empty.
        let label = if ranked.is_empty() {
            Sentiment::Negative
        } else {
            Sentiment::Positive
        };

        let html = render_html(text, label, &ranked);

        Ok(Some(Explanation {
            label,
            features: ranked,
            html,
        }))
    }
}

/// One word occurrence in the input, pointing at its vocabulary slot.
struct TokenOccurrence {
    surface: String,
    feature: usize,
}

/// One distinct (case-folded) token.
struct VocabEntry {
    key: String,
    surface: String,
}

/// Split into word tokens and build the distinct-token vocabulary. Masking a
/// feature removes every occurrence of that token.
fn tokenize(text: &str) -> (Vec<TokenOccurrence>, Vec<VocabEntry>) {
    let mut tokens = Vec::new();
    let mut vocab: Vec<VocabEntry> = Vec::new();

    for m in WORD_RE.find_iter(text) {
        let surface = m.as_str().to_string();
        let key = surface.to_lowercase();

        let feature = match vocab.iter().position(|entry| entry.key == key) {
            Some(idx) => idx,
            None => {
                vocab.push(VocabEntry {
                    key,
                    surface: surface.clone(),
                });
                vocab.len() - 1
            }
        };

        tokens.push(TokenOccurrence { surface, feature });
    }

    (tokens, vocab)
}

fn render_variant(tokens: &[TokenOccurrence], mask: &[bool]) -> String {
    let kept: Vec<&str> = tokens
        .iter()
        .filter(|t| mask[t.feature])
        .map(|t| t.surface.as_str())
        .collect();
    kept.join(" ")
}

/// Render the artifact: the explained label, the ranked token weights, and
/// the input text with attributed tokens highlighted.
fn render_html(text: &str, label: Sentiment, features: &[TokenWeight]) -> String {
    use std::fmt::Write;

    let mut html = String::new();
    let _ = write!(
        html,
        "<div class=\"explanation\"><p class=\"explanation-label\">{label}</p>"
    );

    html.push_str("<ul class=\"explanation-weights\">");
    for feature in features {
        let _ = write!(
            html,
            "<li><span class=\"token\">{}</span> <span class=\"weight\">{:+.4}</span></li>",
            html_escape::encode_text(&feature.token),
            feature.weight
        );
    }
    html.push_str("</ul>");

    html.push_str("<p class=\"explanation-text\">");
    let mut cursor = 0;
    for m in WORD_RE.find_iter(text) {
        html.push_str(&html_escape::encode_text(&text[cursor..m.start()]));

        let key = m.as_str().to_lowercase();
        match features
            .iter()
            .find(|f| f.token.to_lowercase() == key)
        {
            Some(feature) => {
                let class = if feature.weight >= 0.0 { "pos" } else { "neg" };
                let _ = write!(
                    html,
                    "<mark class=\"{class}\">{}</mark>",
                    html_escape::encode_text(m.as_str())
                );
            }
            None => html.push_str(&html_escape::encode_text(m.as_str())),
        }
        cursor = m.end();
    }
    html.push_str(&html_escape::encode_text(&text[cursor..]));
    html.push_str("</p></div>");

    html
}
