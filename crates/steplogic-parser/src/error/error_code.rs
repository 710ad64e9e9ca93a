//! Error codes for the step-logic diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E1xx` - Step structure
//! - `E2xx` - Conditions, groups and assignments
//! - `E3xx` - Cross-references and latch blocks

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Step Structure (E1xx)
    // =========================================================================
    /// Duplicate step number.
    ///
    /// Two numbered declarations use the same step number.
    E100,

    /// Non-monotonic step number.
    ///
    /// A step number is lower than a number declared before it.
    E101,

    /// Missing step description.
    ///
    /// A declaration has nothing after its colon.
    E102,

    /// Step number out of range.
    ///
    /// A step number exceeds the configured maximum.
    E103,

    /// Invalid step number.
    ///
    /// A numbered step uses 0; step numbers start at 1.
    E104,

    // =========================================================================
    // Conditions (E2xx)
    // =========================================================================
    /// Unparseable condition line.
    ///
    /// The line contains no identifier and was excluded.
    E200,

    /// Empty step.
    ///
    /// A declaration is followed by no condition lines.
    E201,

    /// Orphan alternative.
    ///
    /// A `+` alternative appears with no condition to pair it with.
    E202,

    /// Mixed operators.
    ///
    /// A labeled group contains plain members after alternatives.
    E203,

    /// Ambiguous assignment.
    ///
    /// A line could be read both as a transition assignment and as a
    /// latch construct.
    E204,

    /// Too many conditions.
    ///
    /// A step carries more conditions than the configured maximum.
    E205,

    // =========================================================================
    // References (E3xx)
    // =========================================================================
    /// Malformed cross-reference.
    ///
    /// A parenthetical names a step keyword but its step expression
    /// cannot be read.
    E300,

    /// Unresolved step reference.
    ///
    /// A same-program reference targets a step that is never declared.
    E301,

    /// Incomplete latch block.
    ///
    /// A latch block lacks its SET or RESET part.
    E302,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "duplicate step number",
            ErrorCode::E101 => "step numbers not increasing",
            ErrorCode::E102 => "missing step description",
            ErrorCode::E103 => "step number out of range",
            ErrorCode::E104 => "invalid step number",
            ErrorCode::E200 => "unparseable condition",
            ErrorCode::E201 => "step has no conditions",
            ErrorCode::E202 => "alternative without preceding condition",
            ErrorCode::E203 => "mixed AND/OR members in group",
            ErrorCode::E204 => "ambiguous assignment or latch block",
            ErrorCode::E205 => "too many conditions",
            ErrorCode::E300 => "malformed cross-reference",
            ErrorCode::E301 => "unresolved step reference",
            ErrorCode::E302 => "incomplete latch block",
        }
    }

    /// Returns the diagnostic category used to group findings in reports.
    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "structure",
            ErrorCode::E101 | ErrorCode::E104 => "numbering",
            ErrorCode::E102 | ErrorCode::E103 | ErrorCode::E205 => "validation",
            ErrorCode::E200 | ErrorCode::E201 => "condition",
            ErrorCode::E202 | ErrorCode::E203 => "grouping",
            ErrorCode::E204 => "assignment",
            ErrorCode::E300 | ErrorCode::E301 => "cross_reference",
            ErrorCode::E302 => "latch",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
