//! Error types for Prism

use thiserror::Error;

/// The main error type for Prism operations
#[derive(Debug, Error)]
pub enum PrismError {
    #[error("No avatar loaded")]
    NoAvatarLoaded,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Import error: {0}")]
    ImportError(String),

    #[error("Missing extension: {0}")]
    MissingExtension(String),

    #[error("Index out of range: {kind} {index}")]
    IndexOutOfRange { kind: String, index: usize },

    #[error("Resolve error: {0}")]
    ResolveError(String),

    #[error("Scene error: {0}")]
    SceneError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl PrismError {
    /// Shorthand for an out-of-range document index
    pub fn out_of_range(kind: impl Into<String>, index: usize) -> Self {
        PrismError::IndexOutOfRange {
            kind: kind.into(),
            index,
        }
    }
}

/// Result type alias for Prism operations
pub type Result<T> = std::result::Result<T, PrismError>;

impl From<toml::de::Error> for PrismError {
    fn from(err: toml::de::Error) -> Self {
        PrismError::TomlParseError(err.to_string())
    }
}
