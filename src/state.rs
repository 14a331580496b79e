use std::sync::Arc;
use tokio::sync::RwLock;

use crate::classifier::{LexiconClassifier, SentimentClassifier};
use crate::config::Config;
use crate::db::Store;
use crate::explain::ExplanationGenerator;
use crate::services::{AuthService, ReviewAnalysisService};

/// Process-wide state built once at startup. The classifier and the
/// explanation generator are loaded here and reused for every request;
/// nothing is reloaded afterwards.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth: Arc<AuthService>,

    pub analysis: Arc<ReviewAnalysisService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_classifier(config, Arc::new(LexiconClassifier::new())).await
    }

    /// Build state around a caller-supplied classifier. Tests use this to
    /// substitute a stub through the trait seam.
    pub async fn with_classifier(
        config: Config,
        classifier: Arc<dyn SentimentClassifier>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let auth = Arc::new(AuthService::new(store.clone(), config.security.clone()));

        let explainer = ExplanationGenerator::new(
            config.explainer.num_samples,
            config.explainer.num_features,
            config.explainer.kernel_width,
        );

        let analysis = Arc::new(ReviewAnalysisService::new(
            store.clone(),
            classifier,
            explainer,
            config.explainer.enabled,
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth,
            analysis,
        })
    }
}
