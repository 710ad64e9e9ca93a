//! Error and diagnostic system for the step-logic parser.
//!
//! This module provides:
//! - Error codes grouped by parsing phase
//! - Severity levels
//! - Labeled source lines for rich error context
//! - A collector accumulating diagnostics while a program is parsed
//! - [`ConfigError`] for syntax tables that cannot be compiled
//!
//! # Overview
//!
//! Parsing never aborts on malformed input. Every problem becomes a
//! [`Diagnostic`] with a code, one or more labeled source lines and
//! optional help text. Diagnostics are partitioned into errors and warnings
//! on the parse result; [`ParseError`] wraps the errors when a caller asks
//! for strict handling.
//!
//! # Example
//!
//! ```
//! # use steplogic_parser::error::{Diagnostic, ErrorCode};
//! let diag = Diagnostic::error("step 3 is declared more than once")
//!     .with_code(ErrorCode::E100)
//!     .with_label(12, "duplicate declaration")
//!     .with_secondary_label(7, "first declared here")
//!     .with_help("renumber one of the steps");
//!
//! assert_eq!(diag.line_number(), Some(12));
//! ```

mod collector;
mod config_error;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use config_error::ConfigError;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
