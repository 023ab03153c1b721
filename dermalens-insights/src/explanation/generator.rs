//! Text generator collaborator contract

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by (or on behalf of) the text generator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Generation switched off globally
    #[error("Text generation disabled")]
    Disabled,

    /// Generator ran and failed
    #[error("Text generation failed: {0}")]
    Failed(String),

    /// Generator did not answer in time (also reported when a deadline-bounded
    /// request falls back before generation finishes)
    #[error("Text generation timed out")]
    Timeout,

    /// Generation future panicked
    #[error("Text generation panicked")]
    Panicked,

    /// Generator returned only whitespace
    #[error("Text generation returned empty output")]
    Empty,
}

/// Slow, possibly unavailable prompt → text service
///
/// Implementations may block on network or on-device inference. The
/// explanation coordinator never lets their failures reach its callers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generator name for logs
    fn name(&self) -> &'static str;

    /// False when generation is globally disabled
    fn is_enabled(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: String) -> Result<String, GenerationError>;
}

/// Generator that is always disabled; every explanation uses the template
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn generate(&self, _prompt: String) -> Result<String, GenerationError> {
        Err(GenerationError::Disabled)
    }
}
