//! Configuration types for step-logic parsing.
//!
//! This module provides the configuration root that controls which keywords
//! the parser recognizes and which program-level checks it reports. All
//! types implement [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining syntax and validation settings.
//! - [`SyntaxRules`] - Keyword synonym sets, time units, HMI pattern and encoding repairs.
//! - [`ValidationRules`] - Thresholds of the configurable checks.
//!
//! Every section and field is optional; missing entries keep the built-in
//! German/Dutch/English defaults.
//!
//! # Example
//!
//! ```
//! # use steplogic::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.syntax().step_keywords().iter().any(|keyword| keyword == "SCHRITT"));
//! assert!(config.validation().require_description());
//! ```

use serde::Deserialize;

pub use steplogic_core::syntax::{SyntaxRules, ValidationRules};

/// Top-level application configuration combining syntax and validation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Syntax rule section.
    #[serde(default)]
    syntax: SyntaxRules,

    /// Validation rule section.
    #[serde(default)]
    validation: ValidationRules,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified syntax and validation rules.
    ///
    /// # Arguments
    ///
    /// * `syntax` - Keyword sets and patterns of the dialect.
    /// * `validation` - Thresholds of the program-level checks.
    pub fn new(syntax: SyntaxRules, validation: ValidationRules) -> Self {
        Self { syntax, validation }
    }

    /// Returns the syntax rules.
    pub fn syntax(&self) -> &SyntaxRules {
        &self.syntax
    }

    /// Returns the validation rules.
    pub fn validation(&self) -> &ValidationRules {
        &self.validation
    }
}
