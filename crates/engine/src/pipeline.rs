use chrono::{DateTime, Utc};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use common::{
    Analysis, Error, FeatureVector, MarketContext, MarketQuote, ModelBackend, PricePoint, Result,
};
use model::{
    FitReport, ForestConfig, LearnedModel, Prediction, ReturnModel, RuleOnlyModel,
    TrainingExample,
};
use store::{MarketSummary, SeriesStore, SnapshotReport};
use strategy::{decide_with_factor, technical_readings, FeatureBuilder, IndicatorSet, PipelineFileConfig};

use crate::portfolio::{value_holdings, Holding, PortfolioValuation};
use crate::status::PipelineStatus;
use crate::training::{derivable_examples, examples_from_series};

/// Store → indicators → features → model → decision, behind two locks.
///
/// Share it with `Arc`. The store lock is always released before the model
/// lock is taken, so readers never wait on a fit to read history.
pub struct StrategyPipeline {
    config: PipelineFileConfig,
    builder: FeatureBuilder,
    store: RwLock<SeriesStore>,
    model: RwLock<Box<dyn ReturnModel>>,
}

impl StrategyPipeline {
    pub fn new(config: PipelineFileConfig, backend: ModelBackend) -> Result<Self> {
        let model: Box<dyn ReturnModel> = match backend {
            ModelBackend::Learned => Box::new(LearnedModel::new(
                forest_config(&config),
                config.training.min_examples,
            )),
            ModelBackend::RuleOnly => Box::new(RuleOnlyModel::new()),
        };
        Self::with_model(config, FeatureBuilder::standard(), model)
    }

    /// Build around any model and feature builder.
    pub fn with_model(
        config: PipelineFileConfig,
        builder: FeatureBuilder,
        model: Box<dyn ReturnModel>,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            backend = model.name(),
            capacity = config.series.capacity,
            features = builder.schema().len(),
            "Strategy pipeline initialized"
        );
        Ok(Self {
            store: RwLock::new(SeriesStore::new(config.series.capacity)),
            config,
            builder,
            model: RwLock::new(model),
        })
    }

    pub fn config(&self) -> &PipelineFileConfig {
        &self.config
    }

    pub async fn backend(&self) -> String {
        self.model.read().await.name().to_string()
    }

    pub async fn is_trained(&self) -> bool {
        self.model.read().await.is_trained()
    }

    // ─── History ──────────────────────────────────────────────────────────────

    pub async fn append(
        &self,
        token: &str,
        price: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.store.write().await.append(token, price, volume, timestamp)
    }

    pub async fn ingest_snapshot(&self, quotes: &[MarketQuote]) -> SnapshotReport {
        self.store.write().await.record_snapshot(quotes)
    }

    /// Tracked tokens, sorted.
    pub async fn tokens(&self) -> Vec<String> {
        self.store.read().await.tokens()
    }

    pub async fn window(&self, token: &str, n: usize) -> Vec<PricePoint> {
        self.store.read().await.window(token, n)
    }

    pub async fn market_context(&self) -> MarketContext {
        self.store
            .read()
            .await
            .market_context(&self.config.market.major_tokens)
    }

    pub async fn market_summary(&self) -> Option<MarketSummary> {
        self.store.read().await.market_summary()
    }

    // ─── Features ─────────────────────────────────────────────────────────────

    /// Indicators over the token's whole retained history.
    pub async fn indicators(&self, token: &str) -> IndicatorSet {
        let history = self.store.read().await.history(token);
        IndicatorSet::compute(&history)
    }

    pub async fn feature_vector(&self, token: &str) -> Result<FeatureVector> {
        let (history, market) = {
            let store = self.store.read().await;
            (
                store.history(token),
                store.market_context(&self.config.market.major_tokens),
            )
        };
        if history.is_empty() {
            return Err(Error::InvalidInput(format!("no price history for {token}")));
        }
        self.builder.build(&IndicatorSet::compute(&history), &market)
    }

    /// Supervised examples from every token's history, all sharing the
    /// current market context.
    pub async fn training_examples(&self) -> Result<Vec<TrainingExample>> {
        let (histories, market) = {
            let store = self.store.read().await;
            let histories: Vec<(String, Vec<PricePoint>)> = store
                .tokens()
                .into_iter()
                .map(|token| {
                    let history = store.history(&token);
                    (token, history)
                })
                .collect();
            (histories, store.market_context(&self.config.market.major_tokens))
        };

        let min_history = self.config.training.min_history;
        let mut examples = Vec::new();
        for (token, history) in &histories {
            let mut derived = examples_from_series(&self.builder, history, &market, min_history)?;
            debug!(token = %token, examples = derived.len(), "Training examples derived");
            examples.append(&mut derived);
        }
        Ok(examples)
    }

    // ─── Model ────────────────────────────────────────────────────────────────

    /// Fit the model on caller-supplied examples. Holds the model write lock
    /// for the whole fit; on a multi-threaded runtime the forest is grown via
    /// `block_in_place` so the worker's other tasks move to another thread.
    pub async fn fit(&self, examples: &[TrainingExample]) -> Result<FitReport> {
        let mut model = self.model.write().await;
        let outcome = run_blocking(|| model.fit(examples));
        match outcome {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!(backend = model.name(), examples = examples.len(), error = %e, "Training failed");
                Err(e)
            }
        }
    }

    pub async fn train_from_history(&self) -> Result<FitReport> {
        let examples = self.training_examples().await?;
        info!(examples = examples.len(), "Training from collected history");
        self.fit(&examples).await
    }

    pub async fn predict(&self, token: &str) -> Result<Prediction> {
        let features = self.feature_vector(token).await?;
        self.model.read().await.predict(&features)
    }

    /// Full analysis for one token: prediction, decision, and explanation.
    pub async fn recommend(&self, token: &str) -> Result<Analysis> {
        let features = self.feature_vector(token).await?;
        let (prediction, backend) = {
            let model = self.model.read().await;
            (model.predict(&features)?, model.name().to_string())
        };

        let technical = technical_readings(&features);
        let lead = prediction.top_features.first().map(|f| f.name.as_str());
        let recommendation = decide_with_factor(prediction.predicted_return, &technical, lead);

        debug!(
            token,
            strategy = %recommendation.strategy,
            confidence = recommendation.confidence,
            "Recommendation built"
        );
        Ok(Analysis {
            token: token.to_string(),
            recommendation,
            key_factors: prediction.top_features,
            technical,
            backend,
            model_features: features.len(),
        })
    }

    // ─── Reporting ────────────────────────────────────────────────────────────

    pub async fn status(&self) -> PipelineStatus {
        let min_history = self.config.training.min_history;
        let (collection, available) = {
            let store = self.store.read().await;
            let available: usize = store
                .tokens()
                .iter()
                .map(|t| derivable_examples(store.len(t), min_history))
                .sum();
            (store.status(), available)
        };
        let (model_trained, backend) = {
            let model = self.model.read().await;
            (model.is_trained(), model.name().to_string())
        };

        PipelineStatus {
            collection,
            training_examples_available: available,
            training_ready: available >= self.config.training.min_examples,
            model_trained,
            backend,
        }
    }

    /// Value holdings at each token's latest price.
    pub async fn value_portfolio(&self, holdings: &[Holding]) -> Result<PortfolioValuation> {
        let store = self.store.read().await;
        value_holdings(holdings, |token| store.latest(token).map(|p| p.price))
    }
}

/// `block_in_place` panics on a current-thread runtime; run inline there.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

fn forest_config(config: &PipelineFileConfig) -> ForestConfig {
    ForestConfig {
        n_trees: config.model.n_trees,
        max_depth: config.model.max_depth,
        min_samples_split: config.model.min_samples_split,
        min_samples_leaf: config.model.min_samples_leaf,
        seed: config.model.seed,
        ..ForestConfig::default()
    }
}
