//! End-to-end tests of the parsing pipeline
//!
//! These tests run whole program descriptions through `parse_with` and check
//! the recovered structure, diagnostics and statistics together.

use steplogic_core::{
    model::{Operator, ParseContext, SourceKind, StepKind, VariableKind},
    syntax::{SyntaxRules, ValidationRules},
};

use crate::{CompiledRules, ParseResult, error::ErrorCode, parse_with};

const EINFUHR: &str = "\
Hauptprogramm Einfuhr FB100 / Symbolik IDB: Haupt_Einfuhr

RUHE: Test

    NICHT HMI01 HAND
    Sicherheitsbereich 1 OK

SCHRITT 1: Freigabe?
- Horde vorselektiert (Selektionsprogramm Horde für Einfuhr SCHRITT 2+5+8+11)
- Füllen 1e Horde aktiv:
  - Füllen Horde aktiv (Füllen Horde N21 SCHRITT 7)
  - + Füllen Horde aktiv (Füllen Horde N22 SCHRITT 7)
- Zeit 10sek ??

SCHRITT 2: Start öffnen
- Letze Käse vorbei Blockierung (Sortentrennung SCHRITT 2)
- Strömung Einfuhrrinne N10/N11: Strömung Einfuhrrinne N10/N11 OK
Start öffnen N10-100 (auto H) =
- NICHT Start schließen
- Freigabe Start Einfuhr = RUHE

SCHRITT 3: Warten
- SCHRITT 2-4
- +Ende Produktion (K5 in Ruhe) (Komm. von K5)

Störung: Einfuhrbahn T10C nicht unten erwartet (T10-205) =
SETZEN    SCHRITT 4-5
Einfuhrbahn T10C unten (T10-205)

RÜCKSETZEN    NICHT SETZEN-Bedingungen
Hand HMI10

SCHRITT 4: Fertig
- Einfuhr bereit (SCHRITT 4-5)

SCHRITT 5: Leeren
- Horde leer
";

/// Helper to parse with the default dialect and validation rules
fn parse_source(source: &str) -> ParseResult {
    parse_with_validation(source, &ValidationRules::default())
}

fn parse_with_validation(source: &str, validation: &ValidationRules) -> ParseResult {
    let rules = CompiledRules::new(&SyntaxRules::default()).expect("default rules compile");
    parse_with(source, &ParseContext::default(), &rules, validation)
}

/// Helper collecting the codes of all diagnostics, errors first
fn codes(result: &ParseResult) -> Vec<ErrorCode> {
    result
        .errors()
        .iter()
        .chain(result.warnings())
        .filter_map(|diagnostic| diagnostic.code())
        .collect()
}

#[cfg(test)]
mod step_structure_tests {
    use super::*;

    #[test]
    fn test_idle_then_numbered_step() {
        let result = parse_source(
            "RUHE: Test\n\nNICHT HMI01 HAND\nSicherheitsbereich 1 OK\n\nSCHRITT 1: Freigabe?",
        );

        assert!(result.errors().is_empty());
        assert_eq!(result.steps().len(), 2);

        let idle = &result.steps()[0];
        assert_eq!(idle.kind(), StepKind::Idle);
        assert_eq!(idle.description(), "Test");
        assert!(idle.entry_conditions().is_empty());

        let first = &result.steps()[1];
        assert_eq!(first.number(), Some(1));
        assert_eq!(first.entry_conditions().len(), 1);
        let group = &first.entry_conditions()[0];
        assert_eq!(group.operator(), Operator::And);
        assert_eq!(group.len(), 2);
        assert!(group.conditions()[0].is_negated());
        assert_eq!(group.conditions()[0].variable(), "HMI01 HAND");
        assert_eq!(group.conditions()[1].variable(), "Sicherheitsbereich 1 OK");
    }

    #[test]
    fn test_steps_keep_declaration_order() {
        let result = parse_source("SCHRITT 1: a\nx\nSCHRITT 2: b\ny\nSCHRITT 3: c\nz");

        let numbers: Vec<Option<u32>> = result.steps().iter().map(|step| step.number()).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_dialects_share_one_rule_table() {
        let result = parse_source("RUST: Wachten\nNIET Hand\nSTAP 1: Vullen\nIDLE: x\nSTEP 2: Fill");

        let kinds: Vec<StepKind> = result.steps().iter().map(|step| step.kind()).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Idle, StepKind::Numbered, StepKind::Idle, StepKind::Numbered]
        );
        assert!(result.steps()[1].entry_conditions()[0].conditions()[0].is_negated());
    }

    #[test]
    fn test_messy_declarations_are_normalized() {
        let result = parse_source("\tschritt-1. Start\r\nBand frei Schritt 2: Fertig\r\nBand voll");

        assert_eq!(result.steps().len(), 2);
        assert_eq!(result.steps()[0].description(), "Start");
        assert_eq!(result.steps()[1].number(), Some(2));
        assert_eq!(result.steps()[1].source_line(), 2);
        assert_eq!(
            result.steps()[1].entry_conditions()[0].conditions()[0].variable(),
            "Band frei"
        );
    }

    #[test]
    fn test_text_without_declarations() {
        let result = parse_source("Nur eine Notiz\nohne Schritte");

        assert!(result.steps().is_empty());
        assert!(result.errors().is_empty());
        assert_eq!(result.metadata().program_name(), Some("Nur eine Notiz"));
    }

    #[test]
    fn test_empty_input() {
        let result = parse_source("");

        assert!(result.steps().is_empty());
        assert!(result.variables().is_empty());
        assert_eq!(result.statistics().total_steps(), 0);
    }
}

#[cfg(test)]
mod placement_tests {
    use super::*;

    #[test]
    fn test_guard_moves_to_next_step_and_exit_stays() {
        let result = parse_source(
            "SCHRITT 1: Öffnen\n\
             Band frei\n\
             Klappe auf =\n\
             NICHT Klappe zu\n\
             SCHRITT 2: Schließen\n\
             Band leer",
        );

        let first = &result.steps()[0];
        assert!(first.entry_conditions().is_empty());
        assert_eq!(first.exit_conditions().len(), 1);
        assert_eq!(first.exit_conditions()[0].conditions()[0].variable(), "Klappe zu");
        assert_eq!(first.assignments()[0].target(), "Klappe auf");

        let second = &result.steps()[1];
        assert_eq!(second.entry_conditions()[0].conditions()[0].variable(), "Band frei");
        assert_eq!(second.exit_conditions()[0].conditions()[0].variable(), "Band leer");
    }

    #[test]
    fn test_empty_step_warns_and_gets_placeholder() {
        let result = parse_source("SCHRITT 1: Start\n\nSCHRITT 2: Ende\nBand leer");

        assert!(result.errors().is_empty());
        assert_eq!(codes(&result), vec![ErrorCode::E201]);
        assert_eq!(result.warnings()[0].line_number(), Some(1));

        let second = &result.steps()[1];
        assert_eq!(second.entry_conditions().len(), 1);
        assert!(second.entry_conditions()[0].is_empty());
    }
}

#[cfg(test)]
mod diagnostic_tests {
    use super::*;

    #[test]
    fn test_duplicate_step_is_one_error_with_both_lines() {
        let result = parse_source("SCHRITT 1: a\nx\nSCHRITT 1: b\ny");

        assert_eq!(result.errors().len(), 1);
        let error = &result.errors()[0];
        assert_eq!(error.code(), Some(ErrorCode::E100));
        let lines: Vec<usize> = error.labels().iter().map(|label| label.line()).collect();
        assert_eq!(lines, vec![3, 1]);
        assert_eq!(result.steps().len(), 2);
    }

    #[test]
    fn test_non_monotonic_numbers_warn() {
        let result = parse_source("SCHRITT 2: a\nx\nSCHRITT 1: b\ny");

        assert!(result.errors().is_empty());
        assert_eq!(codes(&result), vec![ErrorCode::E101]);
    }

    #[test]
    fn test_unparseable_line_reports_original_line() {
        let result = parse_source("\n\nSCHRITT 1: a\n  ---\nBand frei");

        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].code(), Some(ErrorCode::E200));
        assert_eq!(result.errors()[0].line_number(), Some(4));
        assert_eq!(result.steps()[0].exit_conditions()[0].len(), 1);
    }

    #[test]
    fn test_unresolved_same_program_reference() {
        let result = parse_source("SCHRITT 1: a\nEinfuhr bereit (SCHRITT 9)");

        assert_eq!(codes(&result), vec![ErrorCode::E301]);
        assert_eq!(result.warnings()[0].line_number(), Some(2));
    }

    #[test]
    fn test_unresolved_range_reference_is_one_warning() {
        let result = parse_source("SCHRITT 1: a\nBand frei (SCHRITT 2-900)");

        assert_eq!(codes(&result), vec![ErrorCode::E301]);
        assert_eq!(
            result.warnings()[0].message(),
            "steps 2-900 are referenced but never declared"
        );
    }

    #[test]
    fn test_oversized_range_is_malformed() {
        let result =
            parse_source("SCHRITT 1: a\nFüllen aktiv (Füllen Horde N21 SCHRITT 1-4000000000)");

        assert_eq!(codes(&result), vec![ErrorCode::E300]);
        assert!(result.cross_references().is_empty());
        assert_eq!(result.steps()[0].exit_conditions()[0].len(), 1);
    }

    #[test]
    fn test_step_zero_is_reported() {
        let result = parse_source("SCHRITT 0: Start\nBand frei\nSCHRITT 1: Weiter\nBand voll");

        assert_eq!(result.steps()[0].number(), Some(0));
        assert!(result.errors().is_empty());
        assert_eq!(codes(&result), vec![ErrorCode::E104]);
        assert_eq!(result.warnings()[0].line_number(), Some(1));
    }

    #[test]
    fn test_malformed_reference_keeps_condition() {
        let result = parse_source("SCHRITT 1: a\nFüllen aktiv (SCHRITT 2 oder 3)");

        assert_eq!(codes(&result), vec![ErrorCode::E300]);
        let condition = &result.steps()[0].exit_conditions()[0].conditions()[0];
        assert!(condition.cross_reference().is_none());
        assert!(result.cross_references().is_empty());
    }

    #[test]
    fn test_validation_thresholds() {
        let validation = ValidationRules::new(Some(10), Some(2), true);
        let result = parse_with_validation("SCHRITT 11:\nA\nB\nC", &validation);

        assert_eq!(
            codes(&result),
            vec![ErrorCode::E102, ErrorCode::E103, ErrorCode::E205]
        );
    }

    #[test]
    fn test_strict_check_rejects_errors() {
        assert!(parse_source(EINFUHR).into_checked().is_ok());

        let err = parse_source("SCHRITT 1: a\nx\nSCHRITT 1: b\ny")
            .into_checked()
            .expect_err("duplicate step");
        assert_eq!(err.diagnostics().len(), 1);
    }
}

#[cfg(test)]
mod program_tests {
    use super::*;

    #[test]
    fn test_einfuhr_program_structure() {
        let result = parse_source(EINFUHR);

        assert!(result.errors().is_empty(), "{:?}", result.errors());
        assert!(result.warnings().is_empty(), "{:?}", result.warnings());
        assert_eq!(result.steps().len(), 6);

        let first = result.step(1).expect("step 1");
        assert_eq!(first.description(), "Freigabe?");
        assert_eq!(first.entry_conditions()[0].len(), 2);

        let second = result.step(2).expect("step 2");
        let operators: Vec<Operator> = second
            .entry_conditions()
            .iter()
            .map(|group| group.operator())
            .collect();
        assert_eq!(operators, vec![Operator::And, Operator::Or, Operator::And]);
        assert_eq!(second.entry_conditions()[1].label(), Some("Füllen 1e Horde aktiv"));
        assert_eq!(second.exit_conditions()[0].conditions()[0].variable(), "Start schließen");
        assert_eq!(second.assignments().len(), 2);
        assert_eq!(second.assignments()[1].value(), Some("RUHE"));

        let fourth = result.step(4).expect("step 4");
        let alternatives = &fourth.entry_conditions()[0];
        assert_eq!(alternatives.operator(), Operator::Or);
        let range = alternatives.conditions()[0]
            .cross_reference()
            .expect("range reference");
        assert_eq!(range.target_steps(), &[2, 3, 4]);
        assert!(range.is_range());

        let last = result.step(5).expect("step 5");
        assert_eq!(last.exit_conditions()[0].conditions()[0].variable(), "Horde leer");
    }

    #[test]
    fn test_einfuhr_latch_block() {
        let result = parse_source(EINFUHR);

        assert_eq!(result.latch_blocks().len(), 1);
        let latch = &result.latch_blocks()[0];
        assert_eq!(latch.variable(), "Einfuhrbahn T10C nicht unten erwartet (T10-205)");
        assert_eq!(latch.source_line(), 26);
        assert_eq!(latch.set_steps(), vec![4, 5]);
        assert_eq!(latch.reset_when().len(), 2);
    }

    #[test]
    fn test_einfuhr_cross_references() {
        let result = parse_source(EINFUHR);

        let lines: Vec<usize> = result
            .cross_references()
            .iter()
            .map(|reference| reference.source_line())
            .collect();
        assert_eq!(lines, vec![9, 11, 12, 16, 23, 34]);

        let first = &result.cross_references()[0];
        assert_eq!(first.description(), "Horde vorselektiert");
        assert_eq!(
            first.target_program(),
            Some("Selektionsprogramm Horde für Einfuhr")
        );
        assert_eq!(first.target_steps(), &[2, 5, 8, 11]);
        assert_eq!(result.external_references().count(), 4);
    }

    #[test]
    fn test_einfuhr_variables() {
        let result = parse_source(EINFUHR);

        let kind_of = |name: &str| {
            result
                .variables()
                .iter()
                .find(|variable| variable.name() == name)
                .map(|variable| variable.kind())
        };

        assert_eq!(result.variables().len(), 12);
        assert_eq!(kind_of("HMI01 HAND"), Some(VariableKind::HmiInput));
        assert_eq!(kind_of("Zeit"), Some(VariableKind::Timer));
        assert_eq!(kind_of("Freigabe Start Einfuhr"), Some(VariableKind::Marker));
        assert_eq!(kind_of("Sicherheitsbereich 1 OK"), Some(VariableKind::Boolean));
        assert_eq!(kind_of("Horde vorselektiert"), None);

        let timers: Vec<&str> = result.timers().map(|timer| timer.name()).collect();
        assert_eq!(timers, vec!["Zeit"]);

        let lines: Vec<usize> = result
            .variables()
            .iter()
            .map(|variable| variable.first_seen_line())
            .collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_einfuhr_metadata_and_statistics() {
        let result = parse_source(EINFUHR);

        assert_eq!(
            result.metadata().program_name(),
            Some("Hauptprogramm Einfuhr FB100 / Symbolik IDB: Haupt_Einfuhr")
        );
        assert_eq!(result.metadata().function_block(), Some("FB100"));

        let stats = result.statistics();
        assert_eq!(stats.total_steps(), 6);
        assert_eq!(stats.idle_steps(), 1);
        assert_eq!(stats.numbered_steps(), 5);
        assert_eq!(stats.total_conditions(), 13);
        assert_eq!(stats.cross_reference_count(), 6);
        assert_eq!(stats.external_reference_count(), 4);
        assert_eq!(stats.variable_count(), 12);
        assert_eq!(stats.timer_count(), 1);
        assert_eq!(stats.latch_block_count(), 1);
    }

    #[test]
    fn test_context_overrides_preamble() {
        let rules = CompiledRules::new(&SyntaxRules::default()).expect("default rules compile");
        let context = ParseContext::new(SourceKind::DocumentExtract)
            .with_program_name("Einfuhr")
            .with_function_block("FB7");

        let result = parse_with(EINFUHR, &context, &rules, &ValidationRules::default());

        assert_eq!(result.metadata().source_kind(), SourceKind::DocumentExtract);
        assert_eq!(result.metadata().program_name(), Some("Einfuhr"));
        assert_eq!(result.metadata().function_block(), Some("FB7"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = format!("{:?}", parse_source(EINFUHR));
        let second = format!("{:?}", parse_source(EINFUHR));
        assert_eq!(first, second);
    }
}

#[cfg(test)]
mod normalization_property_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::normalize::{normalize, normalize_lines};

    fn line() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("RUHE: Test".to_string()),
            Just("  schritt 3 . Füllen".to_string()),
            Just("\t- NICHT HMI01 HAND".to_string()),
            Just("Band frei SCHRITT 4: Fertig".to_string()),
            Just("- + von schritt 2".to_string()),
            Just("StÃ¶rung: Motor =".to_string()),
            Just("SETZEN SCHRITT 4-5".to_string()),
            "[ a-zA-Z0-9:+()=-]{0,30}",
        ]
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(lines in proptest::collection::vec(line(), 0..12)) {
            let rules = CompiledRules::new(&SyntaxRules::default()).expect("default rules compile");
            let text = lines.join("\r\n");

            let once = normalize(&text, &rules);
            let twice = normalize(&once, &rules);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_line_numbers_point_into_input(lines in proptest::collection::vec(line(), 1..12)) {
            let rules = CompiledRules::new(&SyntaxRules::default()).expect("default rules compile");
            let text = lines.join("\n");

            let normalized = normalize_lines(&text, &rules);
            let mut previous = 0;
            for line in &normalized {
                prop_assert!(line.number() >= 1 && line.number() <= lines.len());
                prop_assert!(line.number() >= previous);
                previous = line.number();
            }
        }

        #[test]
        fn prop_parse_never_panics(lines in proptest::collection::vec(line(), 0..16)) {
            let result = parse_source(&lines.join("\n"));
            let stats = result.statistics();
            prop_assert_eq!(stats.total_steps(), result.steps().len());
            prop_assert_eq!(stats.idle_steps() + stats.numbered_steps(), stats.total_steps());
        }
    }
}
