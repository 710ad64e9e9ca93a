//! StepLogic - Structured parsing of industrial step-logic descriptions.
//!
//! Turns the semi-structured text of sequential step programs (idle state,
//! numbered steps, transition conditions, latch blocks) into a typed program
//! model with diagnostics. German, Dutch and English keyword dialects are
//! recognized out of the box.

pub mod config;

mod error;

pub use steplogic_core::{model, syntax};
pub use steplogic_parser::{
    ParseResult,
    error::{Diagnostic, ErrorCode, ParseError, Severity},
};

pub use error::StepLogicError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use steplogic_core::model::ParseContext;
use steplogic_parser::CompiledRules;

use config::AppConfig;

/// Builder for parsing step-logic program descriptions.
///
/// The syntax rules of the configuration are compiled once when the
/// builder is created and reused for every parse.
///
/// # Examples
///
/// ```rust
/// use steplogic::{ProgramBuilder, config::AppConfig};
///
/// let source = "RUHE: Grundstellung\nNICHT Hand\nSCHRITT 1: Start\nBand frei";
///
/// let builder = ProgramBuilder::new(AppConfig::default())
///     .expect("Failed to compile rules");
///
/// let program = builder.parse(source);
/// assert_eq!(program.steps().len(), 2);
/// assert!(program.errors().is_empty());
/// ```
#[derive(Debug)]
pub struct ProgramBuilder {
    config: AppConfig,
    rules: CompiledRules,
    context: ParseContext,
}

impl ProgramBuilder {
    /// Create a new program builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including syntax and validation rules
    ///
    /// # Errors
    ///
    /// Returns [`StepLogicError::Config`] if the syntax rules cannot be
    /// compiled, for example when a keyword set is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steplogic::{ProgramBuilder, config::AppConfig};
    ///
    /// let builder = ProgramBuilder::new(AppConfig::default());
    /// assert!(builder.is_ok());
    /// ```
    pub fn new(config: AppConfig) -> Result<Self, StepLogicError> {
        let rules = CompiledRules::new(config.syntax())?;
        debug!("Syntax rules compiled");

        Ok(Self {
            config,
            rules,
            context: ParseContext::default(),
        })
    }

    /// Attach the metadata context every parsed program is tagged with.
    pub fn with_context(mut self, context: ParseContext) -> Self {
        self.context = context;
        self
    }

    /// Returns the configuration the builder was created with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a program description.
    ///
    /// Parsing never fails on malformed text: problems are reported in
    /// [`ParseResult::errors`] and [`ParseResult::warnings`] next to the
    /// structure that could be recovered.
    ///
    /// # Arguments
    ///
    /// * `source` - Program description text
    pub fn parse(&self, source: &str) -> ParseResult {
        info!(bytes = source.len(); "Parsing program");

        let result = steplogic_parser::parse_with(
            source,
            &self.context,
            &self.rules,
            self.config.validation(),
        );

        debug!(
            steps = result.steps().len(),
            errors = result.errors().len(),
            warnings = result.warnings().len();
            "Program parsed"
        );
        trace!(statistics:? = result.statistics(); "Program statistics");

        result
    }

    /// Parse a program description and reject it if it has errors.
    ///
    /// # Errors
    ///
    /// Returns [`StepLogicError::Parse`] with every error diagnostic and
    /// the source text when the program has at least one error. Warnings
    /// never fail the parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steplogic::{ProgramBuilder, StepLogicError, config::AppConfig};
    ///
    /// let builder = ProgramBuilder::new(AppConfig::default())
    ///     .expect("Failed to compile rules");
    ///
    /// let duplicate = "SCHRITT 1: a\nx\nSCHRITT 1: b\ny";
    /// assert!(matches!(
    ///     builder.parse_strict(duplicate),
    ///     Err(StepLogicError::Parse { .. })
    /// ));
    /// ```
    pub fn parse_strict(&self, source: &str) -> Result<ParseResult, StepLogicError> {
        self.parse(source)
            .into_checked()
            .map_err(|err| StepLogicError::new_parse_error(err, source))
    }

    /// Read and parse a program description file.
    ///
    /// # Errors
    ///
    /// Returns [`StepLogicError::Io`] if the file cannot be read.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParseResult, StepLogicError> {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Reading program description");

        let source = fs::read_to_string(path)?;
        Ok(self.parse(&source))
    }
}
