//! Error types for Hearth

use thiserror::Error;

/// The main error type for Hearth operations
#[derive(Debug, Error)]
pub enum HearthError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid range: {field} has min {min} greater than max {max}")]
    InvalidRange { field: String, min: f64, max: f64 },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl HearthError {
    /// True for errors raised while validating emitter or scene configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HearthError::ConfigurationError(_) | HearthError::InvalidRange { .. }
        )
    }
}

/// Result type alias for Hearth operations
pub type Result<T> = std::result::Result<T, HearthError>;

impl From<toml::de::Error> for HearthError {
    fn from(err: toml::de::Error) -> Self {
        HearthError::TomlParseError(err.to_string())
    }
}
