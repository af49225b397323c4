//! Return predictors behind one trait, so the pipeline can swap backends.

pub mod forest;
pub mod learned;
pub mod rule_only;
pub mod scaler;
mod tree;

pub use forest::{ForestConfig, RandomForest};
pub use learned::LearnedModel;
pub use rule_only::RuleOnlyModel;
pub use scaler::StandardScaler;

use serde::{Deserialize, Serialize};

use common::{FeatureImportance, FeatureVector, Result};

/// How many ranked features a prediction carries.
pub const TOP_FEATURES: usize = 5;

/// One supervised example: the features at time `t` and the realized
/// next-period return.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_return: f64,
    /// Most important features, descending. Empty for backends without a ranking.
    pub top_features: Vec<FeatureImportance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub samples: usize,
    pub features: usize,
    /// Coefficient of determination on the training set; `None` when the
    /// targets have no variance or nothing was fitted.
    pub in_sample_r2: Option<f64>,
}

/// A next-period return predictor.
///
/// `fit` must be atomic: on error the model keeps whatever state it had.
pub trait ReturnModel: Send + Sync {
    /// Backend identifier reported alongside recommendations.
    fn name(&self) -> &str;

    /// Whether `predict` can succeed.
    fn is_trained(&self) -> bool;

    fn fit(&mut self, examples: &[TrainingExample]) -> Result<FitReport>;

    fn predict(&self, features: &FeatureVector) -> Result<Prediction>;

    /// Feature names the model was trained on, if it is bound to a schema.
    fn feature_names(&self) -> Option<&[String]>;
}
