use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Forest error: {0}")]
    Forest(#[from] ForestError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("Provider failed for {image}: {reason}")]
    ProviderFailed { image: String, reason: String },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding worker pool is empty")]
    EmptyPool,

    #[error("Embedding batch {generation} was superseded")]
    Cancelled { generation: u64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForestError {
    #[error("Forest has not been trained")]
    NotTrained,

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Training set has {features} rows but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    #[error("Invalid class label {label}, expected 0 or 1")]
    InvalidLabel { label: u8 },

    #[error("Invalid hyperparameter {name}: {value}")]
    InvalidHyperparameter { name: String, value: String },

    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
