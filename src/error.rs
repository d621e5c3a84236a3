//! Error types for the typing engine

use thiserror::Error;

/// Errors surfaced by the typing engine.
///
/// Expected edge cases (typing past the end of the passage, deleting at the
/// start, keystrokes after the timer expired) are not errors; they are no-ops.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Invalid session setup: empty corpus, zero words, zero duration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Status write outside the passage
    #[error("index {index} out of range for passage of length {len}")]
    Index { index: usize, len: usize },
}

impl EngineError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        EngineError::Configuration(msg.into())
    }

    /// Configuration errors are fatal at construction; index errors are bugs.
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
