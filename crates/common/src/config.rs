use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Which return model backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelBackend {
    /// Feature scaling + random forest, must be trained before use.
    #[default]
    Learned,
    /// Heuristic momentum extrapolation, no training step.
    RuleOnly,
}

impl FromStr for ModelBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "learned" => Ok(ModelBackend::Learned),
            "rule-only" | "rule_only" | "rules" => Ok(ModelBackend::RuleOnly),
            other => Err(Error::Config(format!(
                "MODEL_BACKEND must be 'learned' or 'rule-only', got: '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelBackend::Learned => write!(f, "learned"),
            ModelBackend::RuleOnly => write!(f, "rule-only"),
        }
    }
}

/// Process-level settings loaded from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the pipeline TOML file (series capacity, model params, ...).
    pub pipeline_config_path: String,
    pub model_backend: ModelBackend,
    /// JSON-lines file of market snapshots, one array of quotes per line.
    pub snapshot_path: Option<String>,
}

impl Config {
    /// Load configuration from the environment. Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let model_backend = match optional_env("MODEL_BACKEND") {
            Some(v) => v.parse()?,
            None => ModelBackend::default(),
        };

        Ok(Config {
            pipeline_config_path: optional_env("PIPELINE_CONFIG_PATH")
                .unwrap_or_else(|| "config/pipeline.toml".to_string()),
            model_backend,
            snapshot_path: optional_env("SNAPSHOT_PATH"),
        })
    }

    /// The snapshot file, failing with a clear message when unset.
    pub fn require_snapshot_path(&self) -> Result<&str> {
        self.snapshot_path.as_deref().ok_or_else(|| {
            Error::Config(
                "Required environment variable 'SNAPSHOT_PATH' is not set. Check your .env file."
                    .to_string(),
            )
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
