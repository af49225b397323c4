//! Signal side of the pipeline: indicators over a price window, the fixed
//! feature schema, and the rule-based decision engine.

pub mod config;
pub mod decision;
pub mod features;
pub mod indicators;

pub use config::{MarketConfig, ModelConfig, PipelineFileConfig, SeriesConfig, TrainingConfig};
pub use decision::{decide, decide_with_factor, technical_readings};
pub use features::{standard_schema, FeatureBuilder, DECISION_FEATURES};
pub use indicators::IndicatorSet;
