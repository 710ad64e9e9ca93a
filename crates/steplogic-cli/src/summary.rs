//! Human-readable program outline.
//!
//! ```text
//! Program: Hauptprogramm Einfuhr FB100 (FB100)
//!
//! RUHE: Test    (line 3)
//!
//! SCHRITT 1: Freigabe?    (line 8)
//!   entry   NOT HMI01 HAND AND Sicherheitsbereich 1 OK
//!
//! Latch blocks
//!   Einfuhrbahn T10C nicht unten erwartet (T10-205) (line 26): set in steps 4, 5; reset by 2 conditions
//!
//! Statistics
//!   steps 6 (1 idle, 5 numbered), conditions 13
//! ```

use std::fmt::Write;

use steplogic::{
    ParseResult,
    model::{Condition, ConditionGroup, Operator, Step, StepKind},
};

/// Render a parse result as an indented outline.
pub fn render(result: &ParseResult) -> String {
    let mut out = String::new();
    // Writing to a String never fails.
    let _ = write_summary(&mut out, result);
    out
}

fn write_summary(out: &mut String, result: &ParseResult) -> std::fmt::Result {
    let metadata = result.metadata();
    match (metadata.program_name(), metadata.function_block()) {
        (Some(name), Some(fb)) => writeln!(out, "Program: {name} ({fb})")?,
        (Some(name), None) => writeln!(out, "Program: {name}")?,
        (None, Some(fb)) => writeln!(out, "Program: {fb}")?,
        (None, None) => writeln!(out, "Program: <unnamed>")?,
    }

    for step in result.steps() {
        writeln!(out)?;
        write_step(out, step)?;
    }

    if !result.latch_blocks().is_empty() {
        writeln!(out, "\nLatch blocks")?;
        for latch in result.latch_blocks() {
            let steps: Vec<String> = latch.set_steps().iter().map(u32::to_string).collect();
            writeln!(
                out,
                "  {} (line {}): set in steps {}; reset by {} conditions",
                latch.variable(),
                latch.source_line(),
                if steps.is_empty() { "-".to_string() } else { steps.join(", ") },
                latch.reset_when().len()
            )?;
        }
    }

    let stats = result.statistics();
    writeln!(out, "\nStatistics")?;
    writeln!(
        out,
        "  steps {} ({} idle, {} numbered), conditions {}",
        stats.total_steps(),
        stats.idle_steps(),
        stats.numbered_steps(),
        stats.total_conditions()
    )?;
    writeln!(
        out,
        "  cross-references {} ({} external), variables {} ({} timers), latch blocks {}",
        stats.cross_reference_count(),
        stats.external_reference_count(),
        stats.variable_count(),
        stats.timer_count(),
        stats.latch_block_count()
    )?;
    writeln!(
        out,
        "  errors {}, warnings {}",
        result.errors().len(),
        result.warnings().len()
    )
}

fn write_step(out: &mut String, step: &Step) -> std::fmt::Result {
    match (step.kind(), step.number()) {
        (StepKind::Numbered, Some(number)) => write!(out, "SCHRITT {number}")?,
        (StepKind::Idle, Some(number)) => write!(out, "RUHE {number}")?,
        _ => write!(out, "RUHE")?,
    }
    writeln!(out, ": {}    (line {})", step.description(), step.source_line())?;

    for group in step.entry_conditions() {
        writeln!(out, "  entry   {}", group_text(group))?;
    }
    for group in step.exit_conditions() {
        writeln!(out, "  exit    {}", group_text(group))?;
    }
    for assignment in step.assignments() {
        match assignment.value() {
            Some(value) => writeln!(out, "  assign  {} = {value}", assignment.target())?,
            None => writeln!(out, "  assign  {}", assignment.target())?,
        }
    }
    Ok(())
}

fn group_text(group: &ConditionGroup) -> String {
    let joiner = match group.operator() {
        Operator::And => " AND ",
        Operator::Or => " OR ",
    };
    let conditions: Vec<String> = group.conditions().iter().map(condition_text).collect();
    let body = if conditions.is_empty() {
        "(none)".to_string()
    } else {
        conditions.join(joiner)
    };
    match group.label() {
        Some(label) => format!("{label}: {body}"),
        None => body,
    }
}

fn condition_text(condition: &Condition) -> String {
    let mut text = String::new();
    if condition.is_negated() {
        text.push_str("NOT ");
    }
    text.push_str(condition.variable());
    if let Some(time) = condition.time_spec() {
        let _ = write!(text, " [{time}]");
    }
    if let Some(reference) = condition.cross_reference() {
        let steps: Vec<String> = reference.target_steps().iter().map(u32::to_string).collect();
        let _ = match reference.target_program() {
            Some(program) => write!(text, " -> {program} #{}", steps.join("+")),
            None => write!(text, " -> #{}", steps.join("+")),
        };
    }
    text
}

#[cfg(test)]
mod tests {
    use steplogic::{ProgramBuilder, config::AppConfig};

    use super::*;

    #[test]
    fn test_summary_outline() {
        let builder = ProgramBuilder::new(AppConfig::default()).expect("Failed to compile rules");
        let result = builder.parse(
            "Einfuhr FB100\nRUHE: Test\nNICHT HMI01 HAND\nSCHRITT 1: Freigabe?\n- Zeit 10sek\n- + Band frei (Band SCHRITT 4)",
        );

        let summary = render(&result);

        assert!(summary.starts_with("Program: Einfuhr FB100 (FB100)\n"));
        assert!(summary.contains("RUHE: Test    (line 2)"));
        assert!(summary.contains("  entry   NOT HMI01 HAND"));
        assert!(summary.contains("Band frei -> Band #4"));
        assert!(summary.contains(" OR "));
        assert!(summary.contains("steps 2 (1 idle, 1 numbered)"));
    }
}
