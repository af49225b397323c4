use serde::{Deserialize, Serialize};

use store::CollectionStatus;

/// Collection progress plus training readiness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatus {
    #[serde(flatten)]
    pub collection: CollectionStatus,
    /// Examples `train_from_history` would derive right now.
    pub training_examples_available: usize,
    pub training_ready: bool,
    pub model_trained: bool,
    pub backend: String,
}
