//! The error enum for the validation engine.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Errors surfaced by evaluators, accumulators, and the driver.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external sort failed: {message}")]
    SortFailed { message: String },

    #[error("reference index for '{key}' has not been published")]
    IndexUnavailable { key: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("evaluator '{key}' used after close")]
    EvaluatorClosed { key: String },

    #[error("accumulator capacity exceeded ({capacity} findings)")]
    AccumulatorOverflow { capacity: usize },

    #[error("accumulator lock poisoned by a panicked writer")]
    AccumulatorPoisoned,

    #[error("accumulator writer disconnected")]
    AccumulatorDisconnected,

    #[error("record source failed: {message}")]
    SourceFailed { message: String },
}

impl ValidationError {
    /// Attach a path to a raw I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::IO_ERROR,
            Self::SortFailed { .. } => error_code::SORT_FAILED,
            Self::IndexUnavailable { .. } => error_code::INDEX_UNAVAILABLE,
            Self::InvalidConfig { .. } => error_code::INVALID_CONFIG,
            Self::EvaluatorClosed { .. } => error_code::EVALUATOR_CLOSED,
            Self::AccumulatorOverflow { .. } => error_code::ACCUMULATOR_OVERFLOW,
            Self::AccumulatorPoisoned => error_code::ACCUMULATOR_POISONED,
            Self::AccumulatorDisconnected => error_code::ACCUMULATOR_DISCONNECTED,
            Self::SourceFailed { .. } => error_code::SOURCE_FAILED,
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
