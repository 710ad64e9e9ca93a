//! The outcome of parsing one program description.

use serde::Serialize;
use steplogic_core::model::{
    CrossReference, LatchBlock, ProgramMetadata, Statistics, Step, Variable, VariableKind,
};

use crate::error::{Diagnostic, ParseError};

/// Everything recovered from one text buffer.
///
/// Parsing is total: malformed input produces diagnostics in
/// [`errors`](Self::errors) and [`warnings`](Self::warnings) next to
/// whatever structure could be recovered.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    metadata: ProgramMetadata,
    steps: Vec<Step>,
    latch_blocks: Vec<LatchBlock>,
    variables: Vec<Variable>,
    cross_references: Vec<CrossReference>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    statistics: Statistics,
}

impl ParseResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        metadata: ProgramMetadata,
        steps: Vec<Step>,
        latch_blocks: Vec<LatchBlock>,
        variables: Vec<Variable>,
        cross_references: Vec<CrossReference>,
        errors: Vec<Diagnostic>,
        warnings: Vec<Diagnostic>,
        statistics: Statistics,
    ) -> Self {
        Self {
            metadata,
            steps,
            latch_blocks,
            variables,
            cross_references,
            errors,
            warnings,
            statistics,
        }
    }

    /// Program name, function block and source kind.
    pub fn metadata(&self) -> &ProgramMetadata {
        &self.metadata
    }

    /// Steps in declaration order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Find the first numbered step with the given number.
    pub fn step(&self, number: u32) -> Option<&Step> {
        self.steps
            .iter()
            .find(|step| !step.is_idle() && step.number() == Some(number))
    }

    pub fn latch_blocks(&self) -> &[LatchBlock] {
        &self.latch_blocks
    }

    /// Distinct variables ordered by first occurrence.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Variables inferred as timers.
    pub fn timers(&self) -> impl Iterator<Item = &Variable> {
        self.variables
            .iter()
            .filter(|variable| variable.kind() == VariableKind::Timer)
    }

    /// Cross-references in source order.
    pub fn cross_references(&self) -> &[CrossReference] {
        &self.cross_references
    }

    /// Cross-references into other programs.
    pub fn external_references(&self) -> impl Iterator<Item = &CrossReference> {
        self.cross_references
            .iter()
            .filter(|reference| reference.is_external())
    }

    /// Error-severity diagnostics in emission order.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Warning-severity diagnostics in emission order.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Returns `true` if any error-severity diagnostic was produced.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Reject the result if it carries errors.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] wrapping every error-severity diagnostic.
    pub fn into_checked(self) -> Result<Self, ParseError> {
        if self.has_errors() {
            Err(ParseError::new(self.errors))
        } else {
            Ok(self)
        }
    }
}
