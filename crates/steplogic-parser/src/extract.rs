//! Step and latch block extraction.
//!
//! Splits normalized lines into blocks:
//!
//! - a **step block** starts at a declaration (`RUHE: ...`, `SCHRITT n: ...`)
//!   and owns every following line up to the next declaration
//! - a **latch block** starts at a `... =` header that is followed by a SET
//!   or RESET line, or that is written as `KEYWORD: variable =`; it ends at
//!   the next declaration, latch header or `=` line
//!
//! Lines after a latch block fall back into the surrounding step block.
//! Lines before the first declaration form the preamble, which only feeds
//! program metadata.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use steplogic_core::model::StepKind;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    normalize::SourceLine,
    rules::CompiledRules,
};

static FUNCTION_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bFB\s?\d+\b").expect("static pattern is valid"));

/// A parsed declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub kind: StepKind,
    pub number: Option<u32>,
    pub description: String,
    pub line: usize,
}

/// A declaration and the lines it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StepBlock {
    pub declaration: Declaration,
    pub lines: Vec<SourceLine>,
}

/// A latch header and its SET/RESET lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LatchSource {
    pub variable: String,
    pub line: usize,
    pub lines: Vec<SourceLine>,
}

/// All blocks of one program, in declaration order.
#[derive(Debug, Default)]
pub(crate) struct Extraction {
    pub preamble: Vec<SourceLine>,
    pub steps: Vec<StepBlock>,
    pub latches: Vec<LatchSource>,
}

impl Extraction {
    /// The first non-blank preamble line.
    pub fn program_name(&self) -> Option<String> {
        self.preamble
            .iter()
            .find(|line| !line.is_blank())
            .map(|line| line.content().to_string())
    }

    /// The first `FB<n>` designation in the preamble.
    pub fn function_block(&self) -> Option<String> {
        self.preamble.iter().find_map(|line| {
            FUNCTION_BLOCK
                .find(line.text())
                .map(|found| found.as_str().replace(char::is_whitespace, "").to_uppercase())
        })
    }
}

/// Split normalized lines into step and latch blocks.
pub(crate) fn extract_blocks(
    lines: &[SourceLine],
    rules: &CompiledRules,
    collector: &mut DiagnosticCollector,
) -> Extraction {
    let mut extraction = Extraction::default();
    let mut current: Option<StepBlock> = None;
    let mut latch: Option<LatchSource> = None;

    for (index, line) in lines.iter().enumerate() {
        if let Some(found) = rules.declaration(line.text()) {
            extraction.latches.extend(latch.take());
            extraction.steps.extend(current.take());
            current = Some(StepBlock {
                declaration: Declaration {
                    kind: found.kind,
                    // `SCHRITT:` without a number is step 1
                    number: match found.kind {
                        StepKind::Numbered => found.number.or(Some(1)),
                        StepKind::Idle => found.number,
                    },
                    description: found.description.to_string(),
                    line: line.number(),
                },
                lines: Vec::new(),
            });
            continue;
        }

        if let Some(variable) = latch_header(lines, index, rules, collector) {
            extraction.latches.extend(latch.take());
            latch = Some(LatchSource {
                variable,
                line: line.number(),
                lines: Vec::new(),
            });
            continue;
        }

        if let Some(open) = latch.as_mut() {
            if assignment_header(line.content()).is_none() {
                open.lines.push(line.clone());
                continue;
            }
            extraction.latches.extend(latch.take());
        }

        match current.as_mut() {
            Some(block) => block.lines.push(line.clone()),
            None => extraction.preamble.push(line.clone()),
        }
    }

    extraction.latches.extend(latch);
    extraction.steps.extend(current);

    debug!(
        steps = extraction.steps.len(),
        latches = extraction.latches.len(),
        preamble = extraction.preamble.len();
        "Blocks extracted"
    );

    extraction
}

/// The target of a `target =` line, or `None` for other lines.
///
/// Comparisons such as `>=`, `<=`, `!=` and `==` are not assignments.
pub(crate) fn assignment_header(content: &str) -> Option<&str> {
    let target = content.strip_suffix('=')?.trim_end();
    if target.ends_with(['=', '<', '>', '!']) {
        return None;
    }
    Some(target)
}

/// Detect a latch header at `index` and return the latched variable.
fn latch_header(
    lines: &[SourceLine],
    index: usize,
    rules: &CompiledRules,
    collector: &mut DiagnosticCollector,
) -> Option<String> {
    let line = &lines[index];
    let content = line.content();
    let target = assignment_header(content)?;

    let keyword_variable = rules.latch_header_variable(content);
    let opens_latch = lines[index + 1..]
        .iter()
        .find(|next| !next.is_blank())
        .is_some_and(|next| rules.opens_latch_part(next.content()));

    match (keyword_variable, opens_latch) {
        (Some(variable), true) => Some(variable.to_string()),
        (None, true) => Some(target.to_string()),
        (Some(_), false) => {
            collector.emit(
                Diagnostic::warning(format!(
                    "`{content}` names a latch keyword but has no SET or RESET part"
                ))
                .with_code(ErrorCode::E204)
                .with_label(line.number(), "read as a transition assignment")
                .with_help("add a SET line below the header to declare a latch block"),
            );
            None
        }
        (None, false) => None,
    }
}
