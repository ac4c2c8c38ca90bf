use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    /// Whether the surrounding batch can carry on without this item.
    fn is_recoverable(&self) -> bool;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Embedding(e) => {
                error!("Embedding error details: {:?}", e);
            }
            CoreError::Forest(e) => {
                error!("Forest error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_recoverable(&self) -> bool {
        match self {
            CoreError::Embedding(e) => e.is_recoverable(),
            CoreError::Forest(e) => e.is_recoverable(),
            CoreError::Config(e) => e.is_recoverable(),
            CoreError::NotFound { .. } => true,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Embedding(e) => e.user_friendly_message(),
            CoreError::Forest(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Io(e) => format!("Could not read or write a file: {}", e),
            CoreError::Serialization(_) => {
                "The session file is not valid JSON for this program.".to_string()
            }
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            CoreError::NotFound { resource } => format!("Could not find: {}", resource),
            CoreError::Internal { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Embedding(_) => "EMBEDDING".to_string(),
            CoreError::Forest(_) => "FOREST".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::NotFound { .. } => "NOT_FOUND".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for EmbeddingError {
    fn log_error(&self) -> &Self {
        error!("EmbeddingError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("EmbeddingError (warning): {}", self);
        self
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, EmbeddingError::EmptyPool)
    }

    fn user_friendly_message(&self) -> String {
        match self {
            EmbeddingError::ProviderFailed { image, .. } => {
                format!("Could not compute an embedding for {}. It will be left unscored.", image)
            }
            EmbeddingError::DimensionMismatch { expected, actual } => format!(
                "Embedding sizes do not match ({} vs {}). Images from different models cannot be compared.",
                expected, actual
            ),
            EmbeddingError::EmptyPool => {
                "No embedding workers are available. Please check the configuration.".to_string()
            }
            EmbeddingError::Cancelled { .. } => {
                "The embedding run was replaced by a newer one.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            EmbeddingError::ProviderFailed { .. } => "EMBEDDING_PROVIDER_FAILED".to_string(),
            EmbeddingError::DimensionMismatch { .. } => "EMBEDDING_DIMENSION_MISMATCH".to_string(),
            EmbeddingError::EmptyPool => "EMBEDDING_EMPTY_POOL".to_string(),
            EmbeddingError::Cancelled { .. } => "EMBEDDING_CANCELLED".to_string(),
        }
    }
}

impl ErrorExt for ForestError {
    fn log_error(&self) -> &Self {
        error!("ForestError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ForestError (warning): {}", self);
        self
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, ForestError::NotTrained | ForestError::EmptyTrainingSet)
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ForestError::NotTrained => {
                "Label a few images before using the learned ranking.".to_string()
            }
            ForestError::EmptyTrainingSet => {
                "There are no labeled images to learn from yet.".to_string()
            }
            ForestError::LengthMismatch { .. } => {
                "Training data and labels are out of step.".to_string()
            }
            ForestError::InvalidLabel { label } => {
                format!("Label {} is not a valid like/dislike class.", label)
            }
            ForestError::InvalidHyperparameter { name, value } => {
                format!("Forest setting '{}' has an invalid value: {}", name, value)
            }
            ForestError::DimensionMismatch { expected, actual } => format!(
                "Feature vector has {} values but the forest expects {}.",
                actual, expected
            ),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ForestError::NotTrained => "FOREST_NOT_TRAINED".to_string(),
            ForestError::EmptyTrainingSet => "FOREST_EMPTY_TRAINING_SET".to_string(),
            ForestError::LengthMismatch { .. } => "FOREST_LENGTH_MISMATCH".to_string(),
            ForestError::InvalidLabel { .. } => "FOREST_INVALID_LABEL".to_string(),
            ForestError::InvalidHyperparameter { .. } => {
                "FOREST_INVALID_HYPERPARAMETER".to_string()
            }
            ForestError::DimensionMismatch { .. } => "FOREST_DIMENSION_MISMATCH".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, ConfigError::FileNotFound { .. })
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found, using defaults.", path)
            }
            ConfigError::InvalidValue { field, value } => {
                format!("Invalid value '{}' for setting '{}'.", value, field)
            }
            ConfigError::ValidationFailed { reason } => {
                format!("Configuration is invalid: {}", reason)
            }
            ConfigError::Parse(_) => {
                "Configuration file has a syntax error. Please check the TOML.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
