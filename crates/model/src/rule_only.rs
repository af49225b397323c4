use tracing::debug;

use common::{Error, FeatureVector, Result};

use crate::{FitReport, Prediction, ReturnModel, TrainingExample};

const MOMENTUM_FEATURE: &str = "momentum_5";
const MOMENTUM_LAG: f64 = 5.0;

/// Momentum extrapolation with no learned state: the five-period percent
/// change spread evenly over those periods.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleOnlyModel;

impl RuleOnlyModel {
    pub fn new() -> Self {
        Self
    }
}

impl ReturnModel for RuleOnlyModel {
    fn name(&self) -> &str {
        "rule-only"
    }

    fn is_trained(&self) -> bool {
        true
    }

    fn fit(&mut self, examples: &[TrainingExample]) -> Result<FitReport> {
        debug!(examples = examples.len(), "Rule-only backend skips training");
        Ok(FitReport {
            samples: 0,
            features: 0,
            in_sample_r2: None,
        })
    }

    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let momentum = features
            .get(MOMENTUM_FEATURE)
            .ok_or_else(|| Error::schema_mismatch(&[MOMENTUM_FEATURE.to_string()], features.names()))?;
        let predicted_return = if momentum.is_finite() {
            momentum / 100.0 / MOMENTUM_LAG
        } else {
            0.0
        };
        Ok(Prediction {
            predicted_return,
            top_features: Vec::new(),
        })
    }

    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}
