// Error taxonomy shared by the training pipeline and the predictor.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictorError {
    /// A requested fighter has no record in the stats table.
    #[error("fighter '{0}' not found")]
    NotFound(String),

    /// The persisted feature layout disagrees with the builder's layout.
    #[error("feature schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Parameters that would turn every prediction into NaN or infinity.
    #[error("corrupt model artifact: {0}")]
    CorruptArtifact(String),

    #[error("unsupported model bundle format '{found}' (expected '{expected}')")]
    BundleVersion { expected: String, found: String },

    #[error("no usable rows: {0}")]
    EmptyDataset(String),

    #[error("training failed: {0}")]
    Training(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PredictorError>;
