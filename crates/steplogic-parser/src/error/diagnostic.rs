//! The core diagnostic type.
//!
//! A [`Diagnostic`] represents a single error or warning with an optional
//! error code, labeled source lines, and help text.

use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::error::{Severity, error_code::ErrorCode, label::Label};

/// A diagnostic message with source location information.
///
/// Diagnostics carry:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - One or more labeled source lines
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// warning[E300]: malformed cross-reference `Füllen aktiv (SCHRITT 2 oder 3)`
///    |
/// 14 | - Füllen aktiv (SCHRITT 2 oder 3)
///    |   ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ step expression not understood
///    |
///    = help: write steps as `7`, `4-5` or `2+5+8`
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use steplogic_parser::error::{Diagnostic, ErrorCode};
    /// let diag = Diagnostic::error("unparseable condition `--`")
    ///     .with_code(ErrorCode::E200)
    ///     .with_label(4, "no identifier on this line");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The 1-based line of the primary label.
    pub fn line_number(&self) -> Option<usize> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::line)
    }

    /// The category of the error code, if any.
    pub fn category(&self) -> Option<&'static str> {
        self.code.map(|code| code.category())
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, line: usize, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(line, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, line: usize, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(line, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "error[E200]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 7)?;
        state.serialize_field("severity", &self.severity)?;
        state.serialize_field("code", &self.code.map(|code| code.as_str()))?;
        state.serialize_field("category", &self.category())?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("line", &self.line_number())?;
        state.serialize_field("labels", &self.labels)?;
        state.serialize_field("help", &self.help)?;
        state.end()
    }
}
