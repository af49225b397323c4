use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient training data: need at least {required} examples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Model is not trained")]
    NotTrained,

    #[error("Feature schema mismatch: expected [{expected}], got [{actual}]")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `SchemaMismatch` from two feature-name lists.
    pub fn schema_mismatch(expected: &[String], actual: &[String]) -> Self {
        Error::SchemaMismatch {
            expected: expected.join(", "),
            actual: actual.join(", "),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
