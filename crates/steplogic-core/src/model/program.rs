//! Parse context, program metadata and derived statistics.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::model::{CrossReference, LatchBlock, Step, Variable, VariableKind};

/// Where the text buffer came from.
///
/// The names match external configuration strings (snake_case).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Typed or pasted by hand (default).
    #[default]
    Manual,
    /// Extracted from a word-processor document.
    DocumentExtract,
}

impl FromStr for SourceKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "document_extract" | "document" | "word" => Ok(Self::DocumentExtract),
            _ => Err("Unsupported source kind"),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Manual => write!(f, "manual"),
            SourceKind::DocumentExtract => write!(f, "document_extract"),
        }
    }
}

/// Caller-supplied context for one parse.
///
/// The context only tags the result; it never changes parsing semantics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseContext {
    source_kind: SourceKind,
    program_name: Option<String>,
    function_block: Option<String>,
}

impl ParseContext {
    /// Create a context for the given source kind.
    pub fn new(source_kind: SourceKind) -> Self {
        Self {
            source_kind,
            ..Self::default()
        }
    }

    /// Set the program name.
    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = Some(name.into());
        self
    }

    /// Set the function block designation (e.g. `FB100`).
    pub fn with_function_block(mut self, function_block: impl Into<String>) -> Self {
        self.function_block = Some(function_block.into());
        self
    }

    /// Get the source kind.
    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    /// Get the program name, if supplied.
    pub fn program_name(&self) -> Option<&str> {
        self.program_name.as_deref()
    }

    /// Get the function block, if supplied.
    pub fn function_block(&self) -> Option<&str> {
        self.function_block.as_deref()
    }
}

/// Descriptive metadata of a parsed program.
///
/// Values supplied in the [`ParseContext`] take precedence over values
/// recovered from the document preamble.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramMetadata {
    source_kind: SourceKind,
    program_name: Option<String>,
    function_block: Option<String>,
}

impl ProgramMetadata {
    /// Create program metadata.
    pub fn new(
        source_kind: SourceKind,
        program_name: Option<String>,
        function_block: Option<String>,
    ) -> Self {
        Self {
            source_kind,
            program_name,
            function_block,
        }
    }

    /// Get the source kind.
    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    /// Get the program name.
    pub fn program_name(&self) -> Option<&str> {
        self.program_name.as_deref()
    }

    /// Get the function block designation.
    pub fn function_block(&self) -> Option<&str> {
        self.function_block.as_deref()
    }
}

/// Counts derived from a finished program.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statistics {
    total_steps: usize,
    idle_steps: usize,
    numbered_steps: usize,
    total_conditions: usize,
    cross_reference_count: usize,
    external_reference_count: usize,
    variable_count: usize,
    timer_count: usize,
    latch_block_count: usize,
}

impl Statistics {
    /// Derive statistics in a single pass over the program parts.
    ///
    /// `total_conditions` counts the entry and exit conditions of steps.
    pub fn collect(
        steps: &[Step],
        latch_blocks: &[LatchBlock],
        variables: &[Variable],
        cross_references: &[CrossReference],
    ) -> Self {
        let mut stats = Self {
            latch_block_count: latch_blocks.len(),
            cross_reference_count: cross_references.len(),
            variable_count: variables.len(),
            ..Self::default()
        };

        for step in steps {
            stats.total_steps += 1;
            if step.is_idle() {
                stats.idle_steps += 1;
            } else {
                stats.numbered_steps += 1;
            }
            stats.total_conditions += step.condition_count();
        }

        stats.external_reference_count = cross_references
            .iter()
            .filter(|reference| reference.is_external())
            .count();
        stats.timer_count = variables
            .iter()
            .filter(|variable| variable.kind() == VariableKind::Timer)
            .count();

        stats
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn idle_steps(&self) -> usize {
        self.idle_steps
    }

    pub fn numbered_steps(&self) -> usize {
        self.numbered_steps
    }

    pub fn total_conditions(&self) -> usize {
        self.total_conditions
    }

    pub fn cross_reference_count(&self) -> usize {
        self.cross_reference_count
    }

    /// Cross-references with a target program.
    pub fn external_reference_count(&self) -> usize {
        self.external_reference_count
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn timer_count(&self) -> usize {
        self.timer_count
    }

    pub fn latch_block_count(&self) -> usize {
        self.latch_block_count
    }
}
