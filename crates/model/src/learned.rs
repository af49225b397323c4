use std::sync::Arc;

use tracing::{debug, info};

use common::{Error, FeatureImportance, FeatureVector, Result, MIN_TRAINING_EXAMPLES};

use crate::forest::{ForestConfig, RandomForest};
use crate::scaler::StandardScaler;
use crate::{FitReport, Prediction, ReturnModel, TrainingExample, TOP_FEATURES};

/// Fewest examples the learned backend will ever fit on.
pub const DEFAULT_MIN_EXAMPLES: usize = MIN_TRAINING_EXAMPLES;

#[derive(Debug)]
enum ModelState {
    Untrained,
    Trained(Box<TrainedState>),
}

#[derive(Debug)]
struct TrainedState {
    names: Arc<[String]>,
    scaler: StandardScaler,
    forest: RandomForest,
    ranking: Vec<FeatureImportance>,
}

/// Standard scaler followed by a random forest regressor.
#[derive(Debug)]
pub struct LearnedModel {
    config: ForestConfig,
    min_examples: usize,
    state: ModelState,
}

impl LearnedModel {
    /// `min_examples` below [`DEFAULT_MIN_EXAMPLES`] is raised to it.
    pub fn new(config: ForestConfig, min_examples: usize) -> Self {
        Self {
            config,
            min_examples: min_examples.max(DEFAULT_MIN_EXAMPLES),
            state: ModelState::Untrained,
        }
    }

    pub fn min_examples(&self) -> usize {
        self.min_examples
    }

    /// Global importances in schema order; empty when untrained.
    pub fn importances(&self) -> Vec<FeatureImportance> {
        match &self.state {
            ModelState::Untrained => Vec::new(),
            ModelState::Trained(state) => state
                .names
                .iter()
                .zip(state.forest.importances())
                .map(|(name, &importance)| FeatureImportance {
                    name: name.clone(),
                    importance,
                })
                .collect(),
        }
    }

    fn validate(&self, examples: &[TrainingExample]) -> Result<Arc<[String]>> {
        if examples.len() < self.min_examples {
            return Err(Error::InsufficientData {
                required: self.min_examples,
                actual: examples.len(),
            });
        }

        let names = examples[0].features.names().clone();
        for (i, example) in examples.iter().enumerate() {
            example.features.ensure_schema(&names)?;
            if !example.target.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "training example {i} has a non-finite target"
                )));
            }
            if example.features.values().iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidInput(format!(
                    "training example {i} has a non-finite feature"
                )));
            }
        }
        Ok(names)
    }
}

impl Default for LearnedModel {
    fn default() -> Self {
        Self::new(ForestConfig::default(), DEFAULT_MIN_EXAMPLES)
    }
}

impl ReturnModel for LearnedModel {
    fn name(&self) -> &str {
        "learned"
    }

    fn is_trained(&self) -> bool {
        matches!(self.state, ModelState::Trained(_))
    }

    fn fit(&mut self, examples: &[TrainingExample]) -> Result<FitReport> {
        let names = self.validate(examples)?;

        let raw: Vec<Vec<f64>> = examples
            .iter()
            .map(|e| e.features.values().to_vec())
            .collect();
        let targets: Vec<f64> = examples.iter().map(|e| e.target).collect();

        let scaler = StandardScaler::fit(&raw);
        let rows: Vec<Vec<f64>> = raw.iter().map(|r| scaler.transform(r)).collect();
        let forest = RandomForest::fit(&self.config, &rows, &targets);

        let fitted: Vec<f64> = rows.iter().map(|r| forest.predict(r)).collect();
        let in_sample_r2 = r_squared(&targets, &fitted);

        let mut ranking: Vec<FeatureImportance> = names
            .iter()
            .zip(forest.importances())
            .map(|(name, &importance)| FeatureImportance {
                name: name.clone(),
                importance,
            })
            .collect();
        // Stable sort: equal importances stay in schema order.
        ranking.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranking.truncate(TOP_FEATURES);

        let report = FitReport {
            samples: examples.len(),
            features: names.len(),
            in_sample_r2,
        };

        self.state = ModelState::Trained(Box::new(TrainedState {
            names,
            scaler,
            forest,
            ranking,
        }));

        info!(
            samples = report.samples,
            features = report.features,
            trees = self.config.n_trees,
            r2 = ?report.in_sample_r2,
            "Learned model trained"
        );
        Ok(report)
    }

    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let ModelState::Trained(state) = &self.state else {
            return Err(Error::NotTrained);
        };
        features.ensure_schema(&state.names)?;
        if features.values().iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput("feature vector has non-finite values".into()));
        }

        let row = state.scaler.transform(features.values());
        let predicted_return = state.forest.predict(&row);
        debug!(predicted_return, "Learned model prediction");

        Ok(Prediction {
            predicted_return,
            top_features: state.ranking.clone(),
        })
    }

    fn feature_names(&self) -> Option<&[String]> {
        match &self.state {
            ModelState::Untrained => None,
            ModelState::Trained(state) => Some(&state.names[..]),
        }
    }
}

fn r_squared(actual: &[f64], fitted: &[f64]) -> Option<f64> {
    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot <= 0.0 {
        return None;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(fitted)
        .map(|(y, f)| (y - f).powi(2))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Arc<[String]> {
        ["momentum_5", "rsi", "volume_ratio"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn examples(n: usize) -> Vec<TrainingExample> {
        let names = names();
        (0..n)
            .map(|i| {
                let momentum = (i as f64 * 0.37).sin() * 5.0;
                let rsi = 30.0 + (i % 40) as f64;
                let values = vec![momentum, rsi, 1.0];
                TrainingExample {
                    features: FeatureVector::new(names.clone(), values).unwrap(),
                    target: momentum / 100.0,
                }
            })
            .collect()
    }

    fn small_model() -> LearnedModel {
        LearnedModel::new(
            ForestConfig {
                n_trees: 15,
                ..Default::default()
            },
            DEFAULT_MIN_EXAMPLES,
        )
    }

    #[test]
    fn too_few_examples_leaves_model_untrained() {
        let mut model = small_model();
        let err = model.fit(&examples(10)).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData {
                required: 50,
                actual: 10
            }
        ));
        assert!(!model.is_trained());
    }

    #[test]
    fn requested_floor_below_fifty_is_raised() {
        let mut model = LearnedModel::new(
            ForestConfig {
                n_trees: 5,
                ..Default::default()
            },
            10,
        );
        assert_eq!(model.min_examples(), 50);

        let err = model.fit(&examples(10)).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData {
                required: 50,
                actual: 10
            }
        ));
        assert!(!model.is_trained());
    }

    #[test]
    fn predict_before_fit_is_not_trained() {
        let model = small_model();
        let probe = examples(1).remove(0).features;
        assert!(matches!(model.predict(&probe), Err(Error::NotTrained)));
        assert!(model.feature_names().is_none());
    }

    #[test]
    fn fit_then_predict_ranks_the_signal_first() {
        let mut model = small_model();
        let data = examples(80);
        let report = model.fit(&data).unwrap();
        assert_eq!(report.samples, 80);
        assert_eq!(report.features, 3);
        assert!(report.in_sample_r2.unwrap() > 0.5);

        let prediction = model.predict(&data[3].features).unwrap();
        assert!(prediction.predicted_return.is_finite());
        assert_eq!(prediction.top_features.len(), 3);
        assert_eq!(prediction.top_features[0].name, "momentum_5");
        // The constant column never splits; it keeps its schema slot last.
        assert_eq!(prediction.top_features[2].name, "volume_ratio");
        assert_eq!(prediction.top_features[2].importance, 0.0);
    }

    #[test]
    fn prediction_is_deterministic() {
        let data = examples(60);
        let mut a = small_model();
        let mut b = small_model();
        a.fit(&data).unwrap();
        b.fit(&data).unwrap();

        let probe = &data[17].features;
        assert_eq!(a.predict(probe).unwrap(), a.predict(probe).unwrap());
        assert_eq!(a.predict(probe).unwrap(), b.predict(probe).unwrap());
    }

    #[test]
    fn renamed_feature_is_a_schema_mismatch() {
        let mut model = small_model();
        model.fit(&examples(60)).unwrap();

        let drifted: Arc<[String]> = ["momentum_5", "rsi_14", "volume_ratio"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let probe = FeatureVector::new(drifted, vec![1.0, 50.0, 1.0]).unwrap();
        assert!(matches!(
            model.predict(&probe),
            Err(Error::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn failed_fit_keeps_previous_state() {
        let mut model = small_model();
        let data = examples(60);
        model.fit(&data).unwrap();
        let before = model.predict(&data[5].features).unwrap();

        let mut poisoned = examples(60);
        poisoned[10].target = f64::NAN;
        assert!(matches!(model.fit(&poisoned), Err(Error::InvalidInput(_))));
        assert!(model.fit(&examples(5)).is_err());

        assert!(model.is_trained());
        assert_eq!(model.predict(&data[5].features).unwrap(), before);
    }

    #[test]
    fn mixed_schemas_are_rejected() {
        let mut model = small_model();
        let mut data = examples(60);
        let other: Arc<[String]> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        data[30].features = FeatureVector::new(other, vec![0.0, 0.0, 0.0]).unwrap();
        assert!(matches!(
            model.fit(&data),
            Err(Error::SchemaMismatch { .. })
        ));
        assert!(!model.is_trained());
    }
}
