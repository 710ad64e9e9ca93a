//! Cross-reference resolution.
//!
//! A condition may end in a parenthetical naming a step of this or another
//! program:
//!
//! ```text
//! Letze Käse vorbei Blockierung (Sortentrennung SCHRITT 2)
//! Horde vorselektiert (Selektionsprogramm Horde SCHRITT 2+5+8+11)
//! Einfuhr bereit (SCHRITT 4-5)
//! ```
//!
//! Only the trailing parenthetical is considered, and only when it contains
//! a cross-reference keyword; `(N10-100)` or `(K5 in Ruhe)` stay part of
//! the condition text. Step expressions are `+`-separated lists of numbers
//! and inclusive `a-b` ranges, parsed with winnow. A range may cover at most
//! [`MAX_RANGE_SPAN`] steps.

use once_cell::sync::Lazy;
use regex::Regex;
use steplogic_core::model::{CrossReference, StepRange};
use winnow::{
    ModalResult, Parser,
    ascii::{digit1, space0},
    combinator::{opt, preceded, separated},
};

use crate::rules::CompiledRules;

/// Widest accepted `a-b` range, counted in steps.
pub(crate) const MAX_RANGE_SPAN: u32 = 1000;

static TRAILING_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?P<inner>[^()]*)\)\s*$").expect("static pattern is valid"));

/// Outcome of resolving the trailing clause of a condition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolution {
    /// No reference clause; the text is an ordinary condition.
    None,
    /// A well-formed reference.
    Resolved(CrossReference),
    /// A clause with a step keyword whose expression could not be read.
    Malformed { clause: String },
}

/// Resolve the trailing `(... STEP expr)` clause of a condition text.
pub(crate) fn resolve(text: &str, line: usize, rules: &CompiledRules) -> Resolution {
    let Some(caps) = TRAILING_CLAUSE.captures(text) else {
        return Resolution::None;
    };
    let inner = caps["inner"].trim();
    if !rules.has_reference_keyword(inner) {
        return Resolution::None;
    }

    let whole = caps.get(0).map_or(0, |m| m.start());
    let description = match text[..whole].trim() {
        "" => inner,
        description => description,
    };

    let parsed = rules
        .reference_clause(inner)
        .and_then(|(program, steps)| Some((program, parse_step_expression(steps)?)));

    match parsed {
        Some((program, ranges)) => Resolution::Resolved(CrossReference::new(
            description,
            program.map(str::to_string),
            &ranges,
            line,
        )),
        None => Resolution::Malformed {
            clause: inner.to_string(),
        },
    }
}

/// Resolve a bare `[FROM] STEP expr` operand to a same-program reference.
pub(crate) fn resolve_operand(text: &str, line: usize, rules: &CompiledRules) -> Option<CrossReference> {
    let ranges = parse_step_expression(rules.step_operand(text)?)?;
    Some(CrossReference::new(text, None, &ranges, line))
}

/// Parse a step expression such as `7`, `4-5` or `2+5+8-11`.
///
/// Returns `None` for zero steps, descending or oversized ranges and
/// trailing garbage.
pub(crate) fn parse_step_expression(text: &str) -> Option<Vec<StepRange>> {
    step_expression.parse(text.trim()).ok()
}

fn step_expression(input: &mut &str) -> ModalResult<Vec<StepRange>> {
    separated(1.., step_term, (space0, '+', space0)).parse_next(input)
}

fn step_term(input: &mut &str) -> ModalResult<StepRange> {
    (step_number, opt(preceded((space0, '-', space0), step_number)))
        .verify(|(start, end): &(u32, Option<u32>)| match end {
            Some(end) => start <= end && end - start < MAX_RANGE_SPAN,
            None => true,
        })
        .map(|(start, end)| StepRange::new(start, end.unwrap_or(start)))
        .parse_next(input)
}

fn step_number(input: &mut &str) -> ModalResult<u32> {
    digit1
        .try_map(str::parse::<u32>)
        .verify(|number: &u32| *number > 0)
        .parse_next(input)
}
