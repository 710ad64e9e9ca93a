//! Step-logic parser.
//!
//! Turns the free-form text of a sequential step program into a
//! [`ParseResult`]: ordered steps with AND/OR condition groups,
//! cross-references, latch blocks, variables and diagnostics.
//!
//! # Pipeline
//!
//! ```text
//! raw text
//!     ↓ normalize       line endings, encoding, whitespace, keyword shapes
//! source lines          (original line numbers kept)
//!     ↓ extract         step blocks, latch blocks, preamble
//!     ↓ conditions      grouping, negation, timers, assignments
//!     ↓ cross-references
//!     ↓ validate        numbering, references, configured limits
//! ParseResult
//! ```
//!
//! # Example
//!
//! ```
//! # use steplogic_core::{model::ParseContext, syntax::SyntaxRules};
//! let text = "RUHE: Test\n\nNICHT HMI01 HAND\nSicherheitsbereich 1 OK\n\nSCHRITT 1: Freigabe?";
//!
//! let result = steplogic_parser::parse(text, &ParseContext::default(), &SyntaxRules::default())
//!     .expect("default rules compile");
//!
//! assert_eq!(result.steps().len(), 2);
//! assert!(result.steps()[0].entry_conditions().is_empty());
//! assert_eq!(result.steps()[1].entry_conditions()[0].len(), 2);
//! assert!(result.errors().is_empty());
//! ```

pub mod error;
pub mod normalize;

mod conditions;
mod crossref;
mod extract;
mod registry;
mod result;
mod rules;
mod validate;

#[cfg(test)]
mod parser_tests;

use log::debug;
use steplogic_core::{
    model::{ParseContext, ProgramMetadata, Statistics, Step},
    syntax::{SyntaxRules, ValidationRules},
};

use crate::{
    conditions::{BlockConditions, ConditionParser},
    error::{ConfigError, DiagnosticCollector},
    extract::StepBlock,
};

pub use result::ParseResult;
pub use rules::CompiledRules;

/// Parse a program description with the given syntax rules.
///
/// Compiles `rules` and applies default validation thresholds. Use
/// [`parse_with`] to reuse compiled rules across many parses.
///
/// # Errors
///
/// Returns [`ConfigError`] if the rule table cannot be compiled. Problems in
/// the text itself never fail the call; they are reported as diagnostics.
pub fn parse(
    source: &str,
    context: &ParseContext,
    rules: &SyntaxRules,
) -> Result<ParseResult, ConfigError> {
    let compiled = CompiledRules::new(rules)?;
    Ok(parse_with(
        source,
        context,
        &compiled,
        &ValidationRules::default(),
    ))
}

/// Parse a program description with precompiled rules.
pub fn parse_with(
    source: &str,
    context: &ParseContext,
    rules: &CompiledRules,
    validation: &ValidationRules,
) -> ParseResult {
    let lines = normalize::normalize_lines(source, rules);
    let mut collector = DiagnosticCollector::new();
    let extraction = extract::extract_blocks(&lines, rules, &mut collector);

    let mut parser = ConditionParser::new(rules, collector);
    let blocks: Vec<BlockConditions> = extraction
        .steps
        .iter()
        .map(|block| parser.step_block(block))
        .collect();
    let latch_blocks: Vec<_> = extraction
        .latches
        .iter()
        .map(|latch| parser.latch_block(latch))
        .collect();
    let (registry, mut cross_references, mut collector) = parser.finish();

    let steps = assemble_steps(&extraction.steps, blocks);
    validate::check_program(&steps, &latch_blocks, validation, &mut collector);

    let variables = registry.into_variables(rules);
    cross_references.sort_by_key(|reference| reference.source_line());
    let statistics = Statistics::collect(&steps, &latch_blocks, &variables, &cross_references);

    let metadata = ProgramMetadata::new(
        context.source_kind(),
        context
            .program_name()
            .map(str::to_string)
            .or_else(|| extraction.program_name()),
        context
            .function_block()
            .map(str::to_string)
            .or_else(|| extraction.function_block()),
    );

    let (errors, warnings) = collector.finish();
    debug!(
        steps = steps.len(),
        variables = variables.len(),
        errors = errors.len(),
        warnings = warnings.len();
        "Program parsed"
    );

    ParseResult::new(
        metadata,
        steps,
        latch_blocks,
        variables,
        cross_references,
        errors,
        warnings,
        statistics,
    )
}

/// Attach block conditions to steps.
///
/// The guard of a block is the entry condition of the next declared step;
/// on the last step it joins the exit conditions instead. Groups written
/// after an assignment header are always exit conditions of their own step.
fn assemble_steps(blocks: &[StepBlock], conditions: Vec<BlockConditions>) -> Vec<Step> {
    let last = blocks.len().saturating_sub(1);
    let mut carried = Vec::new();

    blocks
        .iter()
        .zip(conditions)
        .enumerate()
        .map(|(index, (block, conditions))| {
            let BlockConditions {
                guard,
                exit,
                assignments,
            } = conditions;
            let declaration = &block.declaration;

            let entry = std::mem::take(&mut carried);
            let exit = if index == last {
                guard.into_iter().chain(exit).collect()
            } else {
                carried = guard;
                exit
            };

            Step::new(
                declaration.kind,
                declaration.number,
                declaration.description.as_str(),
                declaration.line,
            )
            .with_entry_conditions(entry)
            .with_exit_conditions(exit)
            .with_assignments(assignments)
        })
        .collect()
}
