use thiserror::Error;

/// Main error type for the prediction service
#[derive(Error, Debug)]
pub enum ServeError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Artifact errors
    #[error("Artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Inference errors
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Non-numeric value {value:?} in column {column} after encoding")]
    NonNumeric { column: String, value: String },

    #[error("Class index {0} has no label mapping")]
    UnknownClass(usize),

    #[error("Dataset has no rows")]
    EmptyDataset,

    #[error("Row index {index} out of range for {rows} rows")]
    RowOutOfRange { index: usize, rows: usize },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServeError {
    pub fn artifact(path: impl AsRef<std::path::Path>, reason: impl Into<String>) -> Self {
        ServeError::Artifact {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for ServeError
pub type Result<T> = std::result::Result<T, ServeError>;
