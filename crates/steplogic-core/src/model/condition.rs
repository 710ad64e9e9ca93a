//! Condition groups and leaf conditions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::model::CrossReference;

/// The operator joining the conditions of one group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// All conditions must hold.
    #[default]
    And,
    /// Any condition may hold.
    Or,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "AND"),
            Operator::Or => write!(f, "OR"),
        }
    }
}

/// Canonical time units recognized in timed conditions.
///
/// Configuration maps dialect abbreviations (`sek`, `min`, `std`, ...) onto
/// these units. The names match external configuration strings (snake_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Short symbol used when rendering a time literal.
    pub fn symbol(&self) -> &'static str {
        match self {
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "h",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "milliseconds" => Ok(Self::Milliseconds),
            "seconds" => Ok(Self::Seconds),
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            _ => Err("Unsupported time unit"),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A time specification attached to a timed condition, e.g. `10sek`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSpec {
    value: f64,
    unit: TimeUnit,
}

impl TimeSpec {
    /// Create a new time specification.
    pub fn new(value: f64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    /// The numeric value as written.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The canonical unit.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// The duration expressed in milliseconds.
    pub fn as_millis(&self) -> f64 {
        let factor = match self.unit {
            TimeUnit::Milliseconds => 1.0,
            TimeUnit::Seconds => 1_000.0,
            TimeUnit::Minutes => 60_000.0,
            TimeUnit::Hours => 3_600_000.0,
        };
        self.value * factor
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// A leaf predicate inside a condition group.
///
/// Negation, cross-reference and time specification are independent
/// annotations; a negated, cross-referencing, timed condition is legal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    raw_text: String,
    variable: String,
    negated: bool,
    cross_reference: Option<CrossReference>,
    time_spec: Option<TimeSpec>,
    source_line: usize,
}

impl Condition {
    /// Create a plain, non-negated condition.
    pub fn new(raw_text: impl Into<String>, variable: impl Into<String>, source_line: usize) -> Self {
        Self {
            raw_text: raw_text.into(),
            variable: variable.into(),
            negated: false,
            cross_reference: None,
            time_spec: None,
            source_line,
        }
    }

    /// Set the negation flag.
    pub fn with_negated(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    /// Attach a cross-reference.
    pub fn with_cross_reference(mut self, cross_reference: CrossReference) -> Self {
        self.cross_reference = Some(cross_reference);
        self
    }

    /// Attach a time specification.
    pub fn with_time_spec(mut self, time_spec: TimeSpec) -> Self {
        self.time_spec = Some(time_spec);
        self
    }

    /// The source line text with markers stripped.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The referenced variable, timer identifier or cross-reference description.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Whether the condition was prefixed with a negation keyword.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The resolved cross-reference, if any.
    pub fn cross_reference(&self) -> Option<&CrossReference> {
        self.cross_reference.as_ref()
    }

    /// The time specification, if any.
    pub fn time_spec(&self) -> Option<TimeSpec> {
        self.time_spec
    }

    /// The 1-based source line of the condition.
    pub fn source_line(&self) -> usize {
        self.source_line
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "NOT ")?;
        }
        write!(f, "{}", self.variable)
    }
}

/// An ordered set of conditions joined by one operator.
///
/// The groups of a step form a conjunction; inside a group the conditions are
/// joined by the group's [`Operator`]. A group may carry a label when it was
/// introduced by a header line such as `Füllen 1e Horde aktiv:`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConditionGroup {
    operator: Operator,
    conditions: Vec<Condition>,
    label: Option<String>,
}

impl ConditionGroup {
    /// Create a new group.
    pub fn new(operator: Operator, conditions: Vec<Condition>) -> Self {
        Self {
            operator,
            conditions,
            label: None,
        }
    }

    /// Set the group label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the joining operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Borrow the conditions in source order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Get the header label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Number of conditions in the group.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns `true` if the group holds no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
