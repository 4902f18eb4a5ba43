//! Crate-wide error type
//!
//! Three kinds of failure exist. Invariant violations (`InvariantViolation`,
//! `LengthMismatch`) are programming errors and are never retried. Malformed
//! persisted state (`CorruptWorldFile`, `UnknownBlockType`) aborts a load
//! without touching the caller's world. Out-of-range coordinates are not errors
//! at all; the world store absorbs them as no-ops.

use std::path::PathBuf;

/// Result alias used throughout the crate
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("Argument mismatch: {positions} positions but {boxes} bounding boxes")]
    LengthMismatch { positions: usize, boxes: usize },

    #[error("Corrupt world file at line {line}: {reason}")]
    CorruptWorldFile { line: usize, reason: String },

    #[error("Grid of {size:?} cells is too large")]
    GridTooLarge { size: [u32; 3] },

    #[error("Unknown block type: {name}")]
    UnknownBlockType { name: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to read configuration {path:?}: {error}")]
    ConfigRead { path: PathBuf, error: std::io::Error },

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// True for the fault kinds that signal a bug rather than bad input
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            EngineError::InvariantViolation { .. } | EngineError::LengthMismatch { .. }
        )
    }
}

/// Create an invariant violation error
pub fn invariant_violation(message: impl Into<String>) -> EngineError {
    EngineError::InvariantViolation {
        message: message.into(),
    }
}

/// Create an invalid configuration error
pub fn invalid_config(message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        message: message.into(),
    }
}
