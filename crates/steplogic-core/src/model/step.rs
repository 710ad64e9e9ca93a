//! Step declarations and the assignments recorded inside a step block.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::model::ConditionGroup;

/// The kind of a step declaration.
///
/// The names match external configuration and report strings (snake_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// The quiescent rest state (`RUHE`, `RUST`, `IDLE`).
    Idle,
    /// A numbered sequence step (`SCHRITT`, `STAP`, `STEP`).
    Numbered,
}

impl FromStr for StepKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "numbered" => Ok(Self::Numbered),
            _ => Err("Unsupported step kind"),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Idle => write!(f, "idle"),
            StepKind::Numbered => write!(f, "numbered"),
        }
    }
}

/// An output assignment written inside a step block.
///
/// Two source forms produce assignments:
/// - `Start öffnen N10-100 (auto H) =` introduces a transition assignment;
///   the conditions that follow it become the step's exit conditions and
///   `value` is absent.
/// - `Freigabe Start Einfuhr = RUHE` is an inline assignment with a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    target: String,
    value: Option<String>,
    source_line: usize,
}

impl Assignment {
    /// Create a new assignment.
    pub fn new(target: impl Into<String>, value: Option<String>, source_line: usize) -> Self {
        Self {
            target: target.into(),
            value,
            source_line,
        }
    }

    /// The assigned variable text.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The inline value, if the assignment was written as `target = value`.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The 1-based source line of the assignment.
    pub fn source_line(&self) -> usize {
        self.source_line
    }
}

/// One stage of a sequential program.
///
/// A step is created for every recognized declaration line. `Numbered` steps
/// always carry a number; `Idle` steps usually omit one.
///
/// Entry conditions are the transition into this step. Exit conditions hold
/// the conditions written after a transition assignment (`X =`) inside the
/// step's own block, and for the last step of a program the trailing
/// transition conditions that have no following step to enter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    kind: StepKind,
    number: Option<u32>,
    description: String,
    entry_conditions: Vec<ConditionGroup>,
    exit_conditions: Vec<ConditionGroup>,
    assignments: Vec<Assignment>,
    source_line: usize,
}

impl Step {
    /// Create a step without any conditions.
    pub fn new(
        kind: StepKind,
        number: Option<u32>,
        description: impl Into<String>,
        source_line: usize,
    ) -> Self {
        Self {
            kind,
            number,
            description: description.into(),
            entry_conditions: Vec::new(),
            exit_conditions: Vec::new(),
            assignments: Vec::new(),
            source_line,
        }
    }

    /// Set the entry condition groups.
    pub fn with_entry_conditions(mut self, groups: Vec<ConditionGroup>) -> Self {
        self.entry_conditions = groups;
        self
    }

    /// Set the exit condition groups.
    pub fn with_exit_conditions(mut self, groups: Vec<ConditionGroup>) -> Self {
        self.exit_conditions = groups;
        self
    }

    /// Set the assignments recorded in the step block.
    pub fn with_assignments(mut self, assignments: Vec<Assignment>) -> Self {
        self.assignments = assignments;
        self
    }

    /// Get the step kind.
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Get the step number, if declared.
    pub fn number(&self) -> Option<u32> {
        self.number
    }

    /// Get the free-text description following the declaration colon.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Borrow the entry condition groups (a conjunction of groups).
    pub fn entry_conditions(&self) -> &[ConditionGroup] {
        &self.entry_conditions
    }

    /// Borrow the exit condition groups (a conjunction of groups).
    pub fn exit_conditions(&self) -> &[ConditionGroup] {
        &self.exit_conditions
    }

    /// Borrow the assignments written in this step's block.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Get the 1-based source line of the declaration.
    pub fn source_line(&self) -> usize {
        self.source_line
    }

    /// Count the leaf conditions over entry and exit groups.
    pub fn condition_count(&self) -> usize {
        self.entry_conditions
            .iter()
            .chain(&self.exit_conditions)
            .map(ConditionGroup::len)
            .sum()
    }

    /// Returns `true` for idle (rest state) steps.
    pub fn is_idle(&self) -> bool {
        self.kind == StepKind::Idle
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.number) {
            (StepKind::Idle, None) => write!(f, "idle: {}", self.description),
            (_, Some(number)) => write!(f, "{} {number}: {}", self.kind, self.description),
            (StepKind::Numbered, None) => write!(f, "numbered: {}", self.description),
        }
    }
}
