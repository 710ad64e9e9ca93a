//! Command-line argument definitions for the StepLogic CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, report format,
//! program metadata, configuration file selection, and logging verbosity.

use clap::{Parser, ValueEnum};

use steplogic::model::{ParseContext, SourceKind};

/// Command-line arguments for the StepLogic parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input program description
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the report file; the report is printed to stdout if omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Program name recorded in the report metadata
    #[arg(long)]
    pub program_name: Option<String>,

    /// Function block designation recorded in the report metadata (e.g. FB100)
    #[arg(long)]
    pub function_block: Option<String>,

    /// Where the text came from
    #[arg(long, value_enum, default_value_t = InputKind::Manual)]
    pub source_kind: InputKind,

    /// Fail when the program has error diagnostics
    #[arg(long)]
    pub strict: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The metadata context described by the arguments.
    pub fn parse_context(&self) -> ParseContext {
        let mut context = ParseContext::new(self.source_kind.into());
        if let Some(name) = &self.program_name {
            context = context.with_program_name(name);
        }
        if let Some(function_block) = &self.function_block {
            context = context.with_function_block(function_block);
        }
        context
    }
}

/// Report formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The full parse result as pretty-printed JSON
    Json,
    /// A human-readable outline with statistics
    Summary,
}

/// Origin of the input text
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Typed or pasted by hand
    Manual,
    /// Extracted from a document
    DocumentExtract,
}

impl From<InputKind> for SourceKind {
    fn from(kind: InputKind) -> Self {
        match kind {
            InputKind::Manual => SourceKind::Manual,
            InputKind::DocumentExtract => SourceKind::DocumentExtract,
        }
    }
}
