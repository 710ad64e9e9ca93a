//! SET/RESET latch declarations.

use serde::Serialize;

use crate::model::{ConditionGroup, StepRange, reference::expand_ranges};

/// A declarative SET/RESET construct for one variable.
///
/// ```text
/// Störung: Einfuhrbahn T10C nicht unten erwartet (T10-205) =
/// SETZEN    SCHRITT 4-5
/// Einfuhrbahn T10C unten (T10-205)
///
/// RÜCKSETZEN    NICHT SETZEN-Bedingungen
/// Hand HMI10
/// ```
///
/// The variable is set while the program is in one of the `set_when` steps
/// (and the optional `set_conditions` hold) and reset when any of the
/// `reset_when` conditions holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatchBlock {
    variable: String,
    set_when: Vec<StepRange>,
    set_conditions: Vec<ConditionGroup>,
    reset_when: ConditionGroup,
    source_line: usize,
}

impl LatchBlock {
    /// Create a new latch block.
    pub fn new(
        variable: impl Into<String>,
        set_when: Vec<StepRange>,
        set_conditions: Vec<ConditionGroup>,
        reset_when: ConditionGroup,
        source_line: usize,
    ) -> Self {
        Self {
            variable: variable.into(),
            set_when,
            set_conditions,
            reset_when,
            source_line,
        }
    }

    /// The latched variable.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The step numbers or ranges in which the variable is set.
    pub fn set_when(&self) -> &[StepRange] {
        &self.set_when
    }

    /// Additional conditions listed under the SET line.
    pub fn set_conditions(&self) -> &[ConditionGroup] {
        &self.set_conditions
    }

    /// The reset conditions (any of them resets the latch).
    pub fn reset_when(&self) -> &ConditionGroup {
        &self.reset_when
    }

    /// The 1-based source line of the latch header.
    pub fn source_line(&self) -> usize {
        self.source_line
    }

    /// All step numbers covered by `set_when`, expanded.
    pub fn set_steps(&self) -> Vec<u32> {
        expand_ranges(&self.set_when)
    }
}
