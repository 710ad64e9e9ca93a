//! Error types for step-logic operations.
//!
//! This module provides the main error type [`StepLogicError`] which wraps
//! the error conditions that can occur while loading and parsing programs.

use std::io;

use thiserror::Error;

use steplogic_parser::error::{ConfigError, ParseError};

/// The main error type for step-logic operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the error diagnostics of a strictly checked
/// parse together with the source text, so that callers can render the
/// labeled lines.
#[derive(Debug, Error)]
pub enum StepLogicError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid syntax rules: {0}")]
    Config(#[from] ConfigError),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl StepLogicError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
