//! CLI logic for the StepLogic parser.
//!
//! This module contains the core CLI logic: load configuration, parse the
//! input description, report diagnostics and write the report.

pub mod error_adapter;

mod args;
mod config;
mod summary;

pub use args::{Args, InputKind, OutputFormat};

use std::{
    fs,
    io::{self, Write},
};

use log::{info, warn};
use serde::Serialize;

use steplogic::{ParseResult, ProgramBuilder, StepLogicError};

use error_adapter::{diagnostics_to_reportables, render_reportables};

/// Exit code for a run that failed before a report could be written.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a program rejected by `--strict` because it has errors.
pub const EXIT_REJECTED: i32 = 2;

/// The JSON report: the input path next to the parse result.
#[derive(Serialize)]
struct Report<'a> {
    input: &'a str,
    #[serde(flatten)]
    program: &'a ParseResult,
}

/// Run the StepLogic CLI application
///
/// This function parses the input file and writes the report to the output
/// file, or to stdout when no output path is given. Diagnostics of the
/// program are logged as rendered reports.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `StepLogicError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Syntax rules that cannot be compiled
/// - Error diagnostics when `--strict` is set
/// - Report serialization errors
pub fn run(args: &Args) -> Result<(), StepLogicError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing program description"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = ProgramBuilder::new(app_config)?.with_context(args.parse_context());
    let program = if args.strict {
        builder.parse_strict(&source)?
    } else {
        builder.parse(&source)
    };

    report_diagnostics(&program, &source);

    let rendered = match args.format {
        OutputFormat::Json => {
            let report = Report {
                input: &args.input,
                program: &program,
            };
            serde_json::to_string_pretty(&report)
                .map_err(|err| StepLogicError::Export(Box::new(err)))?
        }
        OutputFormat::Summary => summary::render(&program),
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            info!(output_file = path; "Report written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}")?;
        }
    }

    Ok(())
}

/// Process exit code for a failed run.
pub fn exit_code(err: &StepLogicError) -> i32 {
    match err {
        StepLogicError::Parse { .. } => EXIT_REJECTED,
        _ => EXIT_FAILURE,
    }
}

/// Log every diagnostic of the parsed program as a rendered report.
fn report_diagnostics(program: &ParseResult, source: &str) {
    let diagnostics = program.errors().iter().chain(program.warnings());

    for report in render_reportables(&diagnostics_to_reportables(diagnostics, source)) {
        warn!("{report}");
    }

    info!(
        errors = program.errors().len(),
        warnings = program.warnings().len();
        "Program checked"
    );
}

#[cfg(test)]
mod tests {
    use std::io;

    use steplogic::{Diagnostic, ParseError};

    use super::*;

    #[test]
    fn test_exit_code() {
        let diagnostics = vec![Diagnostic::error("step 1 is declared more than once")];
        let rejected = StepLogicError::new_parse_error(ParseError::from(diagnostics), "");
        assert_eq!(exit_code(&rejected), EXIT_REJECTED);

        let missing = StepLogicError::Io(io::Error::other("no such file"));
        assert_eq!(exit_code(&missing), EXIT_FAILURE);
    }
}
