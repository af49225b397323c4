pub mod config;
pub mod error;
pub mod features;
pub mod types;

pub use config::{Config, ModelBackend};
pub use error::{Error, Result};
pub use features::{FeatureDefault, FeatureSchema, FeatureSpec, FeatureVector};
pub use types::*;
