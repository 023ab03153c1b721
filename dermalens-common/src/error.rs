//! Common error types for Dermalens

use thiserror::Error;

/// Common result type for Dermalens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Dermalens crates
///
/// Scoring, comparison and explanation never return these; they resolve
/// unavailable input through fallbacks. Only configuration loading and
/// collaborator I/O surface errors.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration file could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON payload could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Value parsed but out of range (e.g. a zero TTL)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
