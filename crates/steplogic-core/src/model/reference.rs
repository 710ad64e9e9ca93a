//! Cross-references to steps of this or another program.

use std::{collections::HashSet, fmt};

use serde::Serialize;

/// An inclusive range of step numbers; a single step has `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StepRange {
    start: u32,
    end: u32,
}

impl StepRange {
    /// Create a range. Callers guarantee `start <= end`.
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "step range must not be descending");
        Self { start, end }
    }

    /// Create a range covering exactly one step.
    pub fn single(step: u32) -> Self {
        Self::new(step, step)
    }

    /// First step of the range.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last step of the range.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Returns `true` if the range spans more than one step.
    pub fn is_range(&self) -> bool {
        self.start != self.end
    }

    /// Iterate over every step number in the range.
    pub fn steps(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

impl fmt::Display for StepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_range() {
            write!(f, "{}-{}", self.start, self.end)
        } else {
            write!(f, "{}", self.start)
        }
    }
}

/// Expand step ranges into an ordered, de-duplicated list of step numbers.
///
/// Steps keep the order of their first appearance.
pub fn expand_ranges(ranges: &[StepRange]) -> Vec<u32> {
    let mut seen = HashSet::new();
    ranges
        .iter()
        .flat_map(StepRange::steps)
        .filter(|step| seen.insert(*step))
        .collect()
}

/// "This condition holds when the target program is in one of these steps."
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    description: String,
    target_program: Option<String>,
    target_steps: Vec<u32>,
    is_range: bool,
    source_line: usize,
}

impl CrossReference {
    /// Build a cross-reference from parsed step ranges.
    pub fn new(
        description: impl Into<String>,
        target_program: Option<String>,
        ranges: &[StepRange],
        source_line: usize,
    ) -> Self {
        Self {
            description: description.into(),
            target_program,
            target_steps: expand_ranges(ranges),
            is_range: ranges.iter().any(StepRange::is_range),
            source_line,
        }
    }

    /// The text preceding the reference clause.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The referenced program; `None` means the same program.
    pub fn target_program(&self) -> Option<&str> {
        self.target_program.as_deref()
    }

    /// The referenced step numbers in source order.
    pub fn target_steps(&self) -> &[u32] {
        &self.target_steps
    }

    /// Whether the step expression contained a `-` range.
    pub fn is_range(&self) -> bool {
        self.is_range
    }

    /// Returns `true` when the reference points into another program.
    pub fn is_external(&self) -> bool {
        self.target_program.is_some()
    }

    /// The 1-based source line of the referencing condition.
    pub fn source_line(&self) -> usize {
        self.source_line
    }
}
