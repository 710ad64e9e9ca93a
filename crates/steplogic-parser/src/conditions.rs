//! Condition parsing and grouping.
//!
//! Each line of a step block is classified and turned into conditions:
//!
//! ```text
//! - Füllen 1e Horde aktiv:                      labeled group header
//!   - Füllen Horde aktiv (Füllen Horde SCHRITT 7)   member
//!   - + Füllen Horde aktiv (Füllen Horde SCHRITT 8) alternative member -> OR
//! - Zeit 10sek ??                               timed condition
//! - NICHT HMI01 HAND                            negated condition
//! Start öffnen N10-100 (auto H) =               transition assignment header
//! - Freigabe Start Einfuhr = RUHE               inline assignment
//! ```
//!
//! Plain lines at the same indentation join one AND group. A line starting
//! with `+` is an alternative: it turns a one-condition group into an OR
//! group, or pairs with the last condition of a larger AND group in a new
//! OR group. A line ending in `:` opens a labeled group whose members are
//! the deeper-indented lines below it.
//!
//! Conditions before the first `X =` header are the block's guard;
//! conditions after it are the exit conditions of the declaring step.

use std::slice;

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use steplogic_core::model::{
    Assignment, Condition, ConditionGroup, CrossReference, LatchBlock, Operator, StepKind,
};

use crate::{
    crossref::{self, Resolution},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    extract::{LatchSource, StepBlock, assignment_header},
    normalize::SourceLine,
    registry::{Registry, Usage},
    rules::CompiledRules,
};

static INLINE_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<target>[^=<>!(]*[^=<>!(\s])\s*=\s*(?P<value>[^=\s].*)$")
        .expect("static pattern is valid")
});

const LIST_MARKERS: [char; 5] = ['-', '*', '•', '–', '·'];

/// Conditions and assignments of one step block.
#[derive(Debug, Default)]
pub(crate) struct BlockConditions {
    /// Groups before the first assignment header.
    pub guard: Vec<ConditionGroup>,
    /// Groups after an assignment header.
    pub exit: Vec<ConditionGroup>,
    pub assignments: Vec<Assignment>,
}

/// A line with list and alternative markers stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineShape<'a> {
    indent: usize,
    alternative: bool,
    content: &'a str,
}

impl<'a> LineShape<'a> {
    fn of(line: &'a SourceLine) -> Self {
        let mut content = line.content();
        if let Some(rest) = content.strip_prefix(LIST_MARKERS) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('+') {
                content = rest.trim_start();
            }
        }

        let alternative = match content.strip_prefix('+') {
            Some(rest) => {
                content = rest.trim_start();
                true
            }
            None => false,
        };

        Self {
            indent: line.indent(),
            alternative,
            content,
        }
    }
}

/// What a step block line means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    Unparseable,
    StrayLatchPart,
    AssignmentHeader(&'a str),
    InlineAssignment { target: &'a str, value: &'a str },
    Label(&'a str),
    Condition(&'a str),
}

#[derive(Debug)]
struct GroupLabel {
    text: String,
    condition: Condition,
}

#[derive(Debug)]
struct OpenGroup {
    operator: Operator,
    conditions: Vec<Condition>,
    indent: usize,
    label: Option<GroupLabel>,
    has_alternative: bool,
    mixed_reported: bool,
}

impl OpenGroup {
    fn new(operator: Operator, conditions: Vec<Condition>, indent: usize) -> Self {
        Self {
            operator,
            conditions,
            indent,
            label: None,
            has_alternative: false,
            mixed_reported: false,
        }
    }
}

/// Incremental AND/OR grouping of one condition sequence.
#[derive(Debug, Default)]
struct GroupBuilder {
    groups: Vec<ConditionGroup>,
    open: Option<OpenGroup>,
}

impl GroupBuilder {
    fn open_label(&mut self, indent: usize, text: &str, condition: Condition) {
        self.close();
        let mut group = OpenGroup::new(Operator::And, Vec::new(), indent);
        group.label = Some(GroupLabel {
            text: text.to_string(),
            condition,
        });
        self.open = Some(group);
    }

    fn push(
        &mut self,
        indent: usize,
        alternative: bool,
        condition: Condition,
        collector: &mut DiagnosticCollector,
    ) {
        if self
            .open
            .as_ref()
            .is_some_and(|open| open.label.is_some() && indent <= open.indent)
        {
            self.close();
        }

        let Some(open) = self.open.as_mut() else {
            let operator = if alternative {
                collector.emit(
                    Diagnostic::warning(format!(
                        "alternative `{}` has no condition to pair with",
                        condition.raw_text()
                    ))
                    .with_code(ErrorCode::E202)
                    .with_label(condition.source_line(), "starts a new OR group")
                    .with_help("write the first alternative without `+`"),
                );
                Operator::Or
            } else {
                Operator::And
            };
            self.open = Some(OpenGroup::new(operator, vec![condition], indent));
            return;
        };

        if open.label.is_some() {
            if alternative {
                open.operator = Operator::Or;
                open.has_alternative = true;
            } else if open.has_alternative && !open.mixed_reported {
                open.mixed_reported = true;
                collector.emit(
                    Diagnostic::warning("group mixes AND and OR members")
                        .with_code(ErrorCode::E203)
                        .with_label(condition.source_line(), "plain member after alternatives")
                        .with_help("all members of the group are read as alternatives"),
                );
            }
            open.conditions.push(condition);
            return;
        }

        if alternative {
            if open.operator == Operator::And && open.conditions.len() > 1 {
                let indent = open.indent;
                let paired = open.conditions.pop();
                self.close();
                let conditions = paired.into_iter().chain([condition]).collect();
                self.open = Some(OpenGroup::new(Operator::Or, conditions, indent));
            } else {
                open.operator = Operator::Or;
                open.conditions.push(condition);
            }
            return;
        }

        if open.operator == Operator::And && open.indent == indent {
            open.conditions.push(condition);
            return;
        }

        self.close();
        self.open = Some(OpenGroup::new(Operator::And, vec![condition], indent));
    }

    fn close(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        let group = match open.label {
            // A header without members is an ordinary condition.
            Some(label) if open.conditions.is_empty() => {
                ConditionGroup::new(Operator::And, vec![label.condition])
            }
            Some(label) => ConditionGroup::new(open.operator, open.conditions).with_label(label.text),
            None => ConditionGroup::new(open.operator, open.conditions),
        };
        self.groups.push(group);
    }

    fn finish(mut self) -> Vec<ConditionGroup> {
        self.close();
        self.groups
    }
}

fn builder_for<'b>(
    guard: &'b mut GroupBuilder,
    exit: &'b mut Option<GroupBuilder>,
) -> &'b mut GroupBuilder {
    match exit {
        Some(exit) => exit,
        None => guard,
    }
}

/// Builds conditions for every block of a program and accumulates the
/// variables, cross-references and diagnostics they produce.
pub(crate) struct ConditionParser<'r> {
    rules: &'r CompiledRules,
    registry: Registry,
    cross_references: Vec<CrossReference>,
    collector: DiagnosticCollector,
}

impl<'r> ConditionParser<'r> {
    pub fn new(rules: &'r CompiledRules, collector: DiagnosticCollector) -> Self {
        Self {
            rules,
            registry: Registry::new(),
            cross_references: Vec::new(),
            collector,
        }
    }

    /// Parse the lines of one step block.
    pub fn step_block(&mut self, block: &StepBlock) -> BlockConditions {
        let mut guard = GroupBuilder::default();
        let mut exit: Option<GroupBuilder> = None;
        let mut assignments = Vec::new();
        let mut has_content = false;

        for line in block.lines.iter().filter(|line| !line.is_blank()) {
            has_content = true;
            let shape = LineShape::of(line);
            let number = line.number();

            match self.classify(shape.content) {
                LineKind::Unparseable => self.unparseable(line),
                LineKind::StrayLatchPart => {
                    self.collector.emit(
                        Diagnostic::warning(format!(
                            "`{}` belongs to a latch block but no latch header precedes it",
                            shape.content
                        ))
                        .with_code(ErrorCode::E204)
                        .with_label(number, "line ignored")
                        .with_help("start the latch with a `variable =` header line"),
                    );
                }
                LineKind::AssignmentHeader(target) => {
                    assignments.push(Assignment::new(target, None, number));
                    self.registry.register(target, number, Usage::Assigned(None));
                    exit.get_or_insert_with(GroupBuilder::default).close();
                }
                LineKind::InlineAssignment { target, value } => {
                    assignments.push(Assignment::new(target, Some(value.to_string()), number));
                    self.registry
                        .register(target, number, Usage::Assigned(Some(value.to_string())));
                }
                LineKind::Label(text) => {
                    let condition = self.condition(text, number);
                    builder_for(&mut guard, &mut exit).open_label(shape.indent, text, condition);
                }
                LineKind::Condition(text) => {
                    let condition = self.condition(text, number);
                    builder_for(&mut guard, &mut exit).push(
                        shape.indent,
                        shape.alternative,
                        condition,
                        &mut self.collector,
                    );
                }
            }
        }

        let mut guard = guard.finish();
        let exit = exit.map(GroupBuilder::finish).unwrap_or_default();

        if !has_content {
            let declaration = &block.declaration;
            let name = match (declaration.kind, declaration.number) {
                (StepKind::Numbered, Some(number)) => format!("step {number}"),
                _ => "idle step".to_string(),
            };
            self.collector.emit(
                Diagnostic::warning(format!("{name} has no conditions"))
                    .with_code(ErrorCode::E201)
                    .with_label(declaration.line, "declared here"),
            );
            guard.push(ConditionGroup::new(Operator::And, Vec::new()));
        }

        self.record(&guard);
        self.record(&exit);

        trace!(
            line = block.declaration.line,
            guard = guard.len(),
            exit = exit.len(),
            assignments = assignments.len();
            "Step block parsed"
        );

        BlockConditions {
            guard,
            exit,
            assignments,
        }
    }

    /// Parse a latch block into its SET and RESET parts.
    pub fn latch_block(&mut self, source: &LatchSource) -> LatchBlock {
        let rules = self.rules;
        let mut set_when = Vec::new();
        let mut set_builder = GroupBuilder::default();
        let mut reset_conditions = Vec::new();
        let mut in_reset = false;
        let mut saw_set = false;
        let mut saw_reset = false;

        self.registry
            .register(&source.variable, source.line, Usage::Latched);

        for line in source.lines.iter().filter(|line| !line.is_blank()) {
            let shape = LineShape::of(line);
            let number = line.number();

            if !shape.content.chars().any(char::is_alphanumeric) {
                self.unparseable(line);
                continue;
            }

            if let Some(operand) = rules.reset_operand(shape.content) {
                in_reset = true;
                saw_reset = true;
                if !operand.is_empty() {
                    reset_conditions.push(self.condition(operand, number));
                }
                continue;
            }

            if let Some(operand) = rules.set_operand(shape.content) {
                in_reset = false;
                saw_set = true;
                match rules
                    .step_operand(operand)
                    .and_then(crossref::parse_step_expression)
                {
                    Some(ranges) => set_when.extend(ranges),
                    None if operand.is_empty() => {}
                    None => {
                        let condition = self.condition(operand, number);
                        set_builder.push(shape.indent, shape.alternative, condition, &mut self.collector);
                    }
                }
                continue;
            }

            let condition = self.condition(shape.content, number);
            if in_reset {
                reset_conditions.push(condition);
            } else {
                set_builder.push(shape.indent, shape.alternative, condition, &mut self.collector);
            }
        }

        let set_conditions = set_builder.finish();
        let reset_when = ConditionGroup::new(Operator::Or, reset_conditions);
        self.record(&set_conditions);
        self.record(slice::from_ref(&reset_when));

        if !saw_set || set_when.is_empty() {
            self.collector.emit(
                Diagnostic::warning(format!(
                    "latch `{}` does not name the steps that set it",
                    source.variable
                ))
                .with_code(ErrorCode::E302)
                .with_label(source.line, "latch declared here")
                .with_help("add a line such as `SETZEN SCHRITT 4-5`"),
            );
        }
        if !saw_reset {
            self.collector.emit(
                Diagnostic::warning(format!("latch `{}` has no RESET part", source.variable))
                    .with_code(ErrorCode::E302)
                    .with_label(source.line, "latch declared here")
                    .with_help("add a RESET line listing the reset conditions"),
            );
        }

        LatchBlock::new(
            source.variable.as_str(),
            set_when,
            set_conditions,
            reset_when,
            source.line,
        )
    }

    /// Hand back the accumulated registry, references and diagnostics.
    pub fn finish(self) -> (Registry, Vec<CrossReference>, DiagnosticCollector) {
        (self.registry, self.cross_references, self.collector)
    }

    fn classify<'a>(&self, content: &'a str) -> LineKind<'a> {
        if !content.chars().any(char::is_alphanumeric) {
            return LineKind::Unparseable;
        }

        let stray_latch_part = self
            .rules
            .set_operand(content)
            .or_else(|| self.rules.reset_operand(content))
            .is_some_and(|operand| operand.is_empty() || self.rules.step_operand(operand).is_some());
        if stray_latch_part {
            return LineKind::StrayLatchPart;
        }

        if let Some(target) = assignment_header(content) {
            return if target.chars().any(char::is_alphanumeric) {
                LineKind::AssignmentHeader(target)
            } else {
                LineKind::Unparseable
            };
        }

        if let Some(caps) = INLINE_ASSIGNMENT.captures(content) {
            if let (Some(target), Some(value)) = (caps.name("target"), caps.name("value")) {
                return LineKind::InlineAssignment {
                    target: target.as_str(),
                    value: value.as_str().trim(),
                };
            }
        }

        match content.strip_suffix(':').map(str::trim_end) {
            Some(label) if label.chars().any(char::is_alphanumeric) => LineKind::Label(label),
            _ => LineKind::Condition(content),
        }
    }

    /// Build one condition, resolving negation, cross-reference and timer.
    fn condition(&mut self, text: &str, line: usize) -> Condition {
        let (negated, body) = match self.rules.strip_negation(text) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        if let Some(reference) = crossref::resolve_operand(body, line, self.rules) {
            return Condition::new(text, body, line)
                .with_negated(negated)
                .with_cross_reference(reference);
        }

        let mut reference = None;
        let mut variable = body.to_string();
        match crossref::resolve(body, line, self.rules) {
            Resolution::None => {}
            Resolution::Resolved(resolved) => {
                variable = resolved.description().to_string();
                reference = Some(resolved);
            }
            Resolution::Malformed { clause } => {
                self.collector.emit(
                    Diagnostic::warning(format!("malformed cross-reference `({clause})`"))
                        .with_code(ErrorCode::E300)
                        .with_label(line, "step expression not understood")
                        .with_help("write steps as `7`, `4-5` or `2+5+8`"),
                );
            }
        }

        let mut time_spec = None;
        if let Some(found) = self.rules.find_time(&variable) {
            time_spec = Some(found.spec);
            variable = timer_name(&variable, found.range);
        }

        let mut condition = Condition::new(text, variable, line).with_negated(negated);
        if let Some(reference) = reference {
            condition = condition.with_cross_reference(reference);
        }
        if let Some(time_spec) = time_spec {
            condition = condition.with_time_spec(time_spec);
        }
        condition
    }

    /// Register the variables and references of finished groups.
    fn record(&mut self, groups: &[ConditionGroup]) {
        for condition in groups.iter().flat_map(ConditionGroup::conditions) {
            if let Some(reference) = condition.cross_reference() {
                self.cross_references.push(reference.clone());
            } else if !self.rules.is_set_reference(condition.variable()) {
                let usage = if condition.time_spec().is_some() {
                    Usage::Timed
                } else {
                    Usage::Predicate
                };
                self.registry
                    .register(condition.variable(), condition.source_line(), usage);
            }
        }
    }

    fn unparseable(&mut self, line: &SourceLine) {
        self.collector.emit(
            Diagnostic::error(format!("unparseable line `{}`", line.content()))
                .with_code(ErrorCode::E200)
                .with_label(line.number(), "no identifier on this line"),
        );
    }
}

/// The name of a timer: the text around the time literal, without
/// punctuation-only tokens. Falls back to the literal itself.
fn timer_name(text: &str, literal: std::ops::Range<usize>) -> String {
    let name = text[..literal.start]
        .split_whitespace()
        .chain(text[literal.end..].split_whitespace())
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        text[literal].to_string()
    } else {
        name
    }
}
