//! Labeled source lines for diagnostic messages.
//!
//! A label associates a message with a 1-based line of the original
//! input, providing context for where an error or warning occurred.

use serde::Serialize;

/// A labeled line in the original input.
///
/// # Primary vs Secondary Labels
///
/// - **Primary labels** mark the main location of an error or warning.
///   There should typically be one primary label per diagnostic.
/// - **Secondary labels** provide additional context, such as "first
///   declared here".
///
/// # Example
///
/// ```text
/// error[E100]: step 3 is declared more than once
///    |
///  7 | SCHRITT 3: Füllen
///    | ----------------- first declared here
/// 12 | SCHRITT 3: Leeren
///    | ^^^^^^^^^^^^^^^^^ duplicate declaration
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    line: usize,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the 1-based line this label applies to.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
