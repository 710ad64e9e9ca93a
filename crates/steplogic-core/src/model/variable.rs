//! Variables and timers collected from conditions and assignments.

use std::fmt;

use serde::Serialize;

/// The inferred category of a referenced identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Only ever read as a plain boolean predicate.
    Boolean,
    /// Referenced by a timed condition.
    Timer,
    /// Written by an assignment or latch.
    Marker,
    /// Matches the HMI-input naming convention.
    HmiInput,
    /// No classification applies.
    Unknown,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableKind::Boolean => "boolean",
            VariableKind::Timer => "timer",
            VariableKind::Marker => "marker",
            VariableKind::HmiInput => "hmi_input",
            VariableKind::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// A distinct identifier referenced by the program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    name: String,
    kind: VariableKind,
    first_seen_line: usize,
    value: Option<String>,
    usage_count: usize,
}

impl Variable {
    /// Create a new variable record.
    pub fn new(
        name: impl Into<String>,
        kind: VariableKind,
        first_seen_line: usize,
        value: Option<String>,
        usage_count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            first_seen_line,
            value,
            usage_count,
        }
    }

    /// The name as first written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The inferred kind.
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// The 1-based line of the first occurrence.
    pub fn first_seen_line(&self) -> usize {
        self.first_seen_line
    }

    /// The value from an inline assignment, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// How many times the identifier was referenced.
    pub fn usage_count(&self) -> usize {
        self.usage_count
    }
}
