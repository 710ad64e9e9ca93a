//! Error adapter for converting step-logic errors and diagnostics to miette.
//!
//! This module provides the bridge between the library's error and
//! diagnostic types and miette's rich report formatting used in the CLI.
//!
//! # Line Labels
//!
//! Diagnostics point at 1-based source lines. The adapter maps each labeled
//! line to the byte span of its trimmed content in the original text, so
//! that miette can underline it.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use steplogic::{Diagnostic, Severity, StepLogicError};

/// Adapter for a single step-logic diagnostic.
///
/// This adapter wraps a single [`Diagnostic`] and implements
/// [`MietteDiagnostic`] to enable rich error formatting in the CLI.
pub struct DiagnosticAdapter<'a> {
    /// The wrapped diagnostic
    diag: &'a Diagnostic,
    /// Source text for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = line_span(self.src, label.line());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for non-diagnostic [`StepLogicError`] variants.
///
/// This adapter handles errors that don't have rich diagnostic information,
/// such as I/O errors, rule compilation errors and export errors.
pub struct ErrorAdapter<'a>(pub &'a StepLogicError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            StepLogicError::Io(_) => "steplogic::io",
            StepLogicError::Config(_) => "steplogic::config",
            StepLogicError::Parse { .. } => return None,
            StepLogicError::Export(_) => "steplogic::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            StepLogicError::Config(_) => Some(Box::new(
                "check the [syntax] section of the configuration file",
            )),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
///
/// This enum wraps either a single diagnostic or a non-diagnostic error,
/// providing a uniform interface for error rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Byte span of the trimmed content of a 1-based source line.
///
/// Lines past the end of the text map to an empty span at the end.
fn line_span(src: &str, line: usize) -> SourceSpan {
    let mut offset = 0;
    for (index, text) in src.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let content = text.trim_end_matches(['\n', '\r']);
            let trimmed = content.trim_start();
            let start = offset + (content.len() - trimmed.len());
            return SourceSpan::new(start.into(), trimmed.trim_end().len());
        }
        offset += text.len();
    }
    SourceSpan::new(src.len().into(), 0)
}

/// Convert diagnostics of one source text into reportables.
pub fn diagnostics_to_reportables<'a>(
    diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
    src: &'a str,
) -> Vec<Reportable<'a>> {
    diagnostics
        .into_iter()
        .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
        .collect()
}

/// Convert a [`StepLogicError`] into a list of reportable errors.
///
/// For [`StepLogicError::Parse`], this returns one [`Reportable`] for
/// each diagnostic in the error. For other error variants, this returns a
/// single [`Reportable`].
pub fn to_reportables(err: &StepLogicError) -> Vec<Reportable<'_>> {
    match err {
        StepLogicError::Parse {
            err: parse_err,
            src,
        } => diagnostics_to_reportables(parse_err.diagnostics(), src),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

/// Render reportables with miette's graphical handler, one string each.
pub fn render_reportables(reportables: &[Reportable<'_>]) -> Vec<String> {
    let reporter = miette::GraphicalReportHandler::new();
    reportables
        .iter()
        .filter_map(|reportable| {
            let mut writer = String::new();
            reporter
                .render_report(&mut writer, reportable)
                .ok()
                .map(|()| writer)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io;

    use steplogic::{ErrorCode, ParseError};

    use super::*;

    const SOURCE: &str = "SCHRITT 1: a\r\n    Band frei\r\nSCHRITT 1: b\n";

    #[test]
    fn test_line_span_skips_indentation() {
        assert_eq!(line_span(SOURCE, 1), SourceSpan::new(0.into(), 12));
        assert_eq!(line_span(SOURCE, 2), SourceSpan::new(18.into(), 9));
        assert_eq!(line_span(SOURCE, 3), SourceSpan::new(29.into(), 12));
        assert_eq!(line_span(SOURCE, 9), SourceSpan::new(SOURCE.len().into(), 0));
    }

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("step 1 is declared more than once")
            .with_code(ErrorCode::E100)
            .with_label(3, "duplicate declaration")
            .with_help("renumber one of the steps");
        let parse_err = ParseError::from(vec![diag]);
        let err = StepLogicError::new_parse_error(parse_err, SOURCE);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "step 1 is declared more than once");
                assert_eq!(d.code().map(|c| c.to_string()), Some("E100".to_string()));
                assert_eq!(d.severity(), Some(miette::Severity::Error));
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_warning_severity() {
        let diag = Diagnostic::warning("step 3 follows step 5").with_label(1, "here");

        let adapter = DiagnosticAdapter::new(&diag, SOURCE);

        assert_eq!(adapter.severity(), Some(miette::Severity::Warning));
    }

    #[test]
    fn test_all_labels_returned() {
        let diag = Diagnostic::error("step 1 is declared more than once")
            .with_label(3, "duplicate declaration")
            .with_secondary_label(1, "first declared here");

        let adapter = DiagnosticAdapter::new(&diag, SOURCE);

        let labels: Vec<_> = adapter.labels().expect("labels present").collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label(), Some("duplicate declaration"));
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 29);
        assert_eq!(labels[1].label(), Some("first declared here"));
        assert!(!labels[1].primary());
        assert_eq!(labels[1].offset(), 0);
    }

    #[test]
    fn test_non_parse_error() {
        let err = StepLogicError::Io(io::Error::other("disk full"));

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "I/O error: disk full");
                assert_eq!(e.code().map(|c| c.to_string()), Some("steplogic::io".to_string()));
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_rendered_report_contains_line() {
        let diag = Diagnostic::warning("malformed cross-reference")
            .with_label(2, "step expression not understood");
        let reportables = diagnostics_to_reportables([&diag], SOURCE);

        let mut writer = String::new();
        miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
            .render_report(&mut writer, &reportables[0])
            .expect("Writing to String buffer is infallible");

        assert!(writer.contains("Band frei"));
        assert!(writer.contains("step expression not understood"));
    }

    #[test]
    fn test_render_reportables_one_report_each() {
        let first = Diagnostic::warning("step 3 follows step 5").with_label(1, "here");
        let second = Diagnostic::warning("latch `Störung` has no RESET part");
        let reportables = diagnostics_to_reportables([&first, &second], SOURCE);

        let reports = render_reportables(&reportables);

        assert_eq!(reports.len(), 2);
        assert!(reports[0].contains("step 3 follows step 5"));
        assert!(reports[1].contains("has no RESET part"));
    }
}
