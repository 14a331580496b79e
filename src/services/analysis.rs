//! Review analysis orchestration: classify, persist, explain, return.

use std::sync::Arc;

use thiserror::Error;
use tokio::task;

use crate::classifier::{ClassScore, ClassifierError, Sentiment, SentimentClassifier};
use crate::db::Store;
use crate::explain::{ExplainError, ExplanationGenerator};

/// Minute precision, matching what the history table displays.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Explain(#[from] ExplainError),

    #[error("Store unavailable: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub id: i32,
    pub sentiment: Sentiment,
    pub confidence: String,
    pub explanation_html: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub sentiment: Sentiment,
    pub confidence: String,
}

/// Orchestrates one review through the pipeline. The classifier and
/// explainer are loaded once at startup and shared across requests; the
/// trait object seam lets tests inject a stub classifier.
pub struct ReviewAnalysisService {
    store: Store,
    classifier: Arc<dyn SentimentClassifier>,
    explainer: Arc<ExplanationGenerator>,
    explain_by_default: bool,
}

impl ReviewAnalysisService {
    #[must_use]
    pub fn new(
        store: Store,
        classifier: Arc<dyn SentimentClassifier>,
        explainer: ExplanationGenerator,
        explain_by_default: bool,
    ) -> Self {
        Self {
            store,
            classifier,
            explainer: Arc::new(explainer),
            explain_by_default,
        }
    }

    /// Analyze a review and persist the verdict.
    ///
    /// The row is written as soon as classification succeeds; a later
    /// explanation failure does not roll it back. A classification failure
    /// propagates before anything is written.
    pub async fn analyze(
        &self,
        owner: &str,
        movie: &str,
        text: &str,
        explain: Option<bool>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let (sentiment, confidence) = self.classify_blocking(text).await?;

        let created_at = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let id = self
            .store
            .insert_review(owner, movie, sentiment.as_str(), &confidence, &created_at)
            .await?;

        tracing::info!(
            "Review {} saved for {}: {} ({})",
            id,
            owner,
            sentiment,
            confidence
        );

        let explanation_html = if explain.unwrap_or(self.explain_by_default) {
            self.explain_blocking(text).await?
        } else {
            None
        };

        Ok(AnalysisResult {
            id,
            sentiment,
            confidence,
            explanation_html,
        })
    }

    /// Re-classify new text and overwrite the stored verdict for `id`.
    ///
    /// Uses the store's permissive update: unknown ids are silent no-ops,
    /// and there is no ownership check. The new text itself is discarded.
    pub async fn update(
        &self,
        id: i32,
        movie: &str,
        text: &str,
    ) -> Result<UpdateResult, AnalysisError> {
        let (sentiment, confidence) = self.classify_blocking(text).await?;

        self.store
            .update_review(id, movie, sentiment.as_str(), &confidence)
            .await?;

        Ok(UpdateResult {
            sentiment,
            confidence,
        })
    }

    /// Classification is a blocking call with no timeout or cancellation;
    /// run it off the async runtime.
    async fn classify_blocking(&self, text: &str) -> Result<(Sentiment, String), AnalysisError> {
        let classifier = Arc::clone(&self.classifier);
        let text = text.to_string();

        let scores = task::spawn_blocking(move || classifier.classify(&text))
            .await
            .map_err(|e| AnalysisError::Internal(format!("Classification task panicked: {e}")))??;

        let top = scores
            .iter()
            .copied()
            .max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| {
                ClassifierError::Unavailable("Classifier returned no classes".to_string())
            })?;

        Ok((top.label, format_confidence(top)))
    }

    async fn explain_blocking(&self, text: &str) -> Result<Option<String>, AnalysisError> {
        let classifier = Arc::clone(&self.classifier);
        let explainer = Arc::clone(&self.explainer);
        let text = text.to_string();

        let explanation = task::spawn_blocking(move || explainer.explain(&text, &*classifier))
            .await
            .map_err(|e| AnalysisError::Internal(format!("Explanation task panicked: {e}")))??;

        Ok(explanation.map(|e| e.html))
    }
}

fn format_confidence(top: ClassScore) -> String {
    format!("{:.2}%", top.score * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassScore;

    /// Fixed-distribution stub, substituted through the trait seam.
    struct StubClassifier {
        positive: f64,
    }

    impl SentimentClassifier for StubClassifier {
        fn classify(&self, _text: &str) -> Result<Vec<ClassScore>, ClassifierError> {
            Ok(vec![
                ClassScore {
                    label: Sentiment::Negative,
                    score: 1.0 - self.positive,
                },
                ClassScore {
                    label: Sentiment::Positive,
                    score: self.positive,
                },
            ])
        }
    }

    struct FailingClassifier;

    impl SentimentClassifier for FailingClassifier {
        fn classify(&self, _text: &str) -> Result<Vec<ClassScore>, ClassifierError> {
            Err(ClassifierError::Unavailable("model offline".to_string()))
        }
    }

    async fn service_with(classifier: Arc<dyn SentimentClassifier>) -> ReviewAnalysisService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        ReviewAnalysisService::new(store, classifier, ExplanationGenerator::default(), true)
    }

    #[tokio::test]
    async fn test_analyze_persists_and_formats_confidence() {
        let service = service_with(Arc::new(StubClassifier { positive: 0.8732 })).await;

        let result = service
            .analyze("alice", "Inception", "some text", Some(false))
            .await
            .unwrap();

        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.confidence, "87.32%");
        assert!(result.explanation_html.is_none());

        let rows = service.store.list_reviews_by_owner("alice").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].movie, "Inception");
        assert_eq!(rows[0].sentiment, "POSITIVE");
        assert_eq!(rows[0].confidence, "87.32%");
    }

    #[tokio::test]
    async fn test_classifier_failure_writes_no_row() {
        let service = service_with(Arc::new(FailingClassifier)).await;

        let result = service.analyze("bob", "Tenet", "whatever", None).await;
        assert!(matches!(result, Err(AnalysisError::Classifier(_))));

        let rows = service.store.list_reviews_by_owner("bob").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_update_overwrites_verdict() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let positive = ReviewAnalysisService::new(
            store.clone(),
            Arc::new(StubClassifier { positive: 0.9 }),
            ExplanationGenerator::default(),
            false,
        );

        let saved = positive
            .analyze("carol", "Dune", "text", Some(false))
            .await
            .unwrap();

        let negative = ReviewAnalysisService::new(
            store.clone(),
            Arc::new(StubClassifier { positive: 0.1 }),
            ExplanationGenerator::default(),
            false,
        );

        let updated = negative
            .update(saved.id, "Dune Part Two", "new text")
            .await
            .unwrap();
        assert_eq!(updated.sentiment, Sentiment::Negative);

        let rows = store.list_reviews_by_owner("carol").await.unwrap();
        assert_eq!(rows[0].movie, "Dune Part Two");
        assert_eq!(rows[0].sentiment, "NEGATIVE");
        assert_eq!(rows[0].confidence, "90.00%");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_silent() {
        let service = service_with(Arc::new(StubClassifier { positive: 0.7 })).await;

        let result = service.update(9999, "Ghost", "text").await;
        assert!(result.is_ok());
    }
}
