//! Program-level checks.
//!
//! Run after all steps are assembled:
//!
//! - duplicate step numbers (E100), numbers below an earlier one (E101) and
//!   step number 0 (E104)
//! - missing descriptions (E102), step numbers above the configured maximum
//!   (E103) and steps with too many conditions (E205)
//! - same-program references to undeclared steps (E301)

use std::collections::{HashMap, HashSet, hash_map::Entry};

use steplogic_core::{
    model::{ConditionGroup, LatchBlock, Step},
    syntax::ValidationRules,
};

use crate::error::{Diagnostic, DiagnosticCollector, ErrorCode};

/// Run every program-level check.
pub(crate) fn check_program(
    steps: &[Step],
    latch_blocks: &[LatchBlock],
    validation: &ValidationRules,
    collector: &mut DiagnosticCollector,
) {
    check_numbering(steps, collector);
    check_limits(steps, validation, collector);
    check_references(steps, latch_blocks, collector);
}

fn step_name(step: &Step) -> String {
    match step.number() {
        Some(number) if !step.is_idle() => format!("step {number}"),
        _ => "idle step".to_string(),
    }
}

fn check_numbering(steps: &[Step], collector: &mut DiagnosticCollector) {
    let mut first_seen: HashMap<u32, usize> = HashMap::new();
    let mut highest: Option<u32> = None;

    for step in steps.iter().filter(|step| !step.is_idle()) {
        let Some(number) = step.number() else {
            continue;
        };

        if number == 0 {
            collector.emit(
                Diagnostic::warning("step number 0 is not a valid step number")
                    .with_code(ErrorCode::E104)
                    .with_label(step.source_line(), "declared here")
                    .with_help("step numbers start at 1"),
            );
        }

        match first_seen.entry(number) {
            Entry::Occupied(first) => collector.emit(
                Diagnostic::error(format!("step {number} is declared more than once"))
                    .with_code(ErrorCode::E100)
                    .with_label(step.source_line(), "duplicate declaration")
                    .with_secondary_label(*first.get(), "first declared here")
                    .with_help("renumber one of the steps"),
            ),
            Entry::Vacant(slot) => {
                slot.insert(step.source_line());
            }
        }

        if let Some(previous) = highest.filter(|previous| number < *previous) {
            collector.emit(
                Diagnostic::warning(format!("step {number} follows step {previous}"))
                    .with_code(ErrorCode::E101)
                    .with_label(step.source_line(), "number lower than an earlier step"),
            );
        }
        highest = highest.max(Some(number));
    }
}

fn check_limits(steps: &[Step], validation: &ValidationRules, collector: &mut DiagnosticCollector) {
    for step in steps {
        if validation.require_description() && step.description().is_empty() {
            collector.emit(
                Diagnostic::warning(format!("{} has no description", step_name(step)))
                    .with_code(ErrorCode::E102)
                    .with_label(step.source_line(), "nothing after the colon"),
            );
        }

        if let (Some(number), Some(max)) = (step.number(), validation.max_step_number()) {
            if number > max {
                collector.emit(
                    Diagnostic::warning(format!("step {number} exceeds the maximum step number {max}"))
                        .with_code(ErrorCode::E103)
                        .with_label(step.source_line(), "declared here"),
                );
            }
        }

        if let Some(max) = validation.max_conditions_per_step() {
            let count = step.condition_count();
            if count > max {
                collector.emit(
                    Diagnostic::warning(format!(
                        "{} has {count} conditions, more than the maximum of {max}",
                        step_name(step)
                    ))
                    .with_code(ErrorCode::E205)
                    .with_label(step.source_line(), "declared here")
                    .with_help("split the step or raise `max_conditions_per_step`"),
                );
            }
        }
    }
}

fn check_references(
    steps: &[Step],
    latch_blocks: &[LatchBlock],
    collector: &mut DiagnosticCollector,
) {
    let declared: HashSet<u32> = steps
        .iter()
        .filter(|step| !step.is_idle())
        .filter_map(Step::number)
        .collect();

    let groups = steps
        .iter()
        .flat_map(|step| step.entry_conditions().iter().chain(step.exit_conditions()))
        .chain(latch_blocks.iter().flat_map(|latch| {
            latch
                .set_conditions()
                .iter()
                .chain(std::iter::once(latch.reset_when()))
        }));

    for condition in groups.flat_map(ConditionGroup::conditions) {
        let Some(reference) = condition.cross_reference() else {
            continue;
        };
        if reference.is_external() {
            continue;
        }
        let missing = undeclared(reference.target_steps(), &declared);
        if missing.is_empty() {
            continue;
        }
        let message = match missing.as_slice() {
            [target] => format!("step {target} is referenced but never declared"),
            _ => format!("steps {} are referenced but never declared", compact_steps(&missing)),
        };
        collector.emit(
            Diagnostic::warning(message)
                .with_code(ErrorCode::E301)
                .with_label(condition.source_line(), "unresolved reference"),
        );
    }

    for latch in latch_blocks {
        let missing = undeclared(&latch.set_steps(), &declared);
        let message = match missing.as_slice() {
            [] => continue,
            [target] => format!(
                "latch `{}` is set in step {target}, which is never declared",
                latch.variable()
            ),
            _ => format!(
                "latch `{}` is set in steps {}, which are never declared",
                latch.variable(),
                compact_steps(&missing)
            ),
        };
        collector.emit(
            Diagnostic::warning(message)
                .with_code(ErrorCode::E301)
                .with_label(latch.source_line(), "unresolved reference"),
        );
    }
}

fn undeclared(targets: &[u32], declared: &HashSet<u32>) -> Vec<u32> {
    let mut missing: Vec<u32> = targets
        .iter()
        .copied()
        .filter(|target| !declared.contains(target))
        .collect();
    missing.sort_unstable();
    missing
}

/// Render sorted step numbers with consecutive runs collapsed: `2-4, 7`.
fn compact_steps(steps: &[u32]) -> String {
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for &step in steps {
        match runs.last_mut() {
            Some((_, end)) if step == *end + 1 => *end = step,
            _ => runs.push((step, step)),
        }
    }
    runs.iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
