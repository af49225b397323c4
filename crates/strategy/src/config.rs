use serde::{Deserialize, Serialize};

use common::{Error, Result, MIN_TRAINING_EXAMPLES};

/// Algorithm parameters for the pipeline (TOML). Every field has a default,
/// so an empty file is a valid config.
///
/// Example `config/pipeline.toml`:
/// ```toml
/// [series]
/// capacity = 50
///
/// [market]
/// major_tokens = ["XLM", "USDC", "AQUA"]
///
/// [model]
/// n_trees = 100
/// max_depth = 12
/// seed = 42
///
/// [training]
/// min_examples = 50
/// min_history = 14
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineFileConfig {
    pub series: SeriesConfig,
    pub market: MarketConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Points retained per token; oldest are evicted first.
    pub capacity: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Token codes counted by the `major_tokens_count` aggregate.
    pub major_tokens: Vec<String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            major_tokens: ["XLM", "USDC", "AQUA", "BTC", "ETH", "EURC", "XRP"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Random forest hyperparameters for the learned backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fewest examples a fit accepts; may be raised, never below 50.
    pub min_examples: usize,
    /// Points a prefix needs before it becomes a training example.
    pub min_history: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            min_examples: MIN_TRAINING_EXAMPLES,
            min_history: 14,
        }
    }
}

impl PipelineFileConfig {
    /// Load and validate a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read pipeline config at '{path}': {e}")))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("invalid pipeline config at '{path}': {e}")))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.series.capacity == 0 {
            return Err(Error::Config("series.capacity must be at least 1".into()));
        }
        if self.model.n_trees == 0 {
            return Err(Error::Config("model.n_trees must be at least 1".into()));
        }
        if self.model.max_depth == 0 {
            return Err(Error::Config("model.max_depth must be at least 1".into()));
        }
        if self.model.min_samples_split < 2 {
            return Err(Error::Config("model.min_samples_split must be at least 2".into()));
        }
        if self.model.min_samples_leaf == 0 {
            return Err(Error::Config("model.min_samples_leaf must be at least 1".into()));
        }
        if self.training.min_examples < MIN_TRAINING_EXAMPLES {
            return Err(Error::Config(format!(
                "training.min_examples must be at least {MIN_TRAINING_EXAMPLES}, got {}",
                self.training.min_examples
            )));
        }
        if self.training.min_history == 0 {
            return Err(Error::Config("training.min_history must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PipelineFileConfig::parse("").unwrap();
        assert_eq!(config, PipelineFileConfig::default());
        assert_eq!(config.series.capacity, 50);
        assert_eq!(config.model.n_trees, 100);
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.training.min_examples, 50);
        assert_eq!(config.training.min_history, 14);
        assert!(config.market.major_tokens.contains(&"XLM".to_string()));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PipelineFileConfig::parse(
            r#"
            [series]
            capacity = 200

            [model]
            n_trees = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.series.capacity, 200);
        assert_eq!(config.model.n_trees, 10);
        assert_eq!(config.model.max_depth, 12);
        assert_eq!(config.training.min_history, 14);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = PipelineFileConfig::parse("[series]\ncapacity = 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(PipelineFileConfig::parse("[model]\nmin_samples_split = 1").is_err());
        assert!(PipelineFileConfig::parse("[series]\ncapacity = \"many\"").is_err());
    }

    #[test]
    fn training_floor_cannot_be_lowered() {
        let err = PipelineFileConfig::parse("[training]\nmin_examples = 10").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(PipelineFileConfig::parse("[training]\nmin_examples = 49").is_err());

        let raised = PipelineFileConfig::parse("[training]\nmin_examples = 120").unwrap();
        assert_eq!(raised.training.min_examples, 120);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = PipelineFileConfig::load("/nonexistent/pipeline.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
