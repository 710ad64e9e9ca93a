//! Collector for accumulating diagnostics while a program is parsed.
//!
//! Every phase reports into the same [`DiagnosticCollector`], so one parse
//! surfaces all problems at once instead of stopping at the first.

use crate::error::Diagnostic;

/// A collector for accumulating diagnostics in emission order.
///
/// # Example
///
/// ```text
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::error("unparseable condition `--`")
///         .with_code(ErrorCode::E200)
///         .with_label(4, "no identifier on this line"),
/// );
/// collector.emit(Diagnostic::warning("step 2 has no conditions"));
///
/// let (errors, warnings) = collector.finish();
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if an error-severity diagnostic was emitted.
    #[cfg(test)]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity().is_error())
    }

    /// Diagnostics emitted so far.
    #[cfg(test)]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Finish collection, partitioning into `(errors, warnings)`.
    ///
    /// Both lists keep emission order.
    pub fn finish(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        self.diagnostics
            .into_iter()
            .partition(|diagnostic| diagnostic.severity().is_error())
    }
}
