use steplogic_core::{
    model::{Operator, ParseContext, SourceKind, StepKind, TimeUnit, VariableKind},
    syntax::{SyntaxRules, ValidationRules},
};
use steplogic_parser::{
    CompiledRules,
    error::{ConfigError, ErrorCode, Severity},
    normalize::normalize,
    parse, parse_with,
};

#[test]
fn test_idle_and_first_step() {
    let source = "RUHE: Test\n\nNICHT HMI01 HAND\nSicherheitsbereich 1 OK\n\nSCHRITT 1: Freigabe?";

    let result = parse(source, &ParseContext::default(), &SyntaxRules::default())
        .expect("Failed to compile rules");

    assert!(result.errors().is_empty());
    assert_eq!(result.steps().len(), 2);
    assert_eq!(result.steps()[0].kind(), StepKind::Idle);
    assert_eq!(result.steps()[0].description(), "Test");
    assert!(result.steps()[0].entry_conditions().is_empty());

    let step = &result.steps()[1];
    assert_eq!(step.description(), "Freigabe?");
    assert_eq!(step.entry_conditions().len(), 1);
    assert_eq!(step.entry_conditions()[0].operator(), Operator::And);
    assert_eq!(step.entry_conditions()[0].len(), 2);
}

#[test]
fn test_dutch_program() {
    let source = "\
Hoofdprogramma Vullen FB 12

RUST: Wachten
NIET Noodstop actief

STAP 1: Vullen
- Niveau laag
- Wachttijd 5 min
";

    let result = parse(source, &ParseContext::default(), &SyntaxRules::default())
        .expect("Failed to compile rules");

    assert!(result.errors().is_empty());
    assert_eq!(result.metadata().function_block(), Some("FB12"));
    assert_eq!(result.steps().len(), 2);

    let entry = &result.steps()[1].entry_conditions()[0];
    assert!(entry.conditions()[0].is_negated());
    assert_eq!(entry.conditions()[0].variable(), "Noodstop actief");

    let timed = &result.steps()[1].exit_conditions()[0].conditions()[1];
    assert_eq!(timed.variable(), "Wachttijd");
    let time = timed.time_spec().expect("timed condition");
    assert_eq!(time.unit(), TimeUnit::Minutes);
    assert_eq!(time.as_millis(), 300_000.0);

    let timer = result.timers().next().expect("one timer");
    assert_eq!(timer.kind(), VariableKind::Timer);
}

#[test]
fn test_alternative_references_to_other_programs() {
    let source = "\
SCHRITT 1: Füllen
- Füllen Horde aktiv (Füllen Horde N21 SCHRITT 7)
- + Füllen Horde aktiv (Füllen Horde N22 SCHRITT 7)
";

    let result = parse(source, &ParseContext::default(), &SyntaxRules::default())
        .expect("Failed to compile rules");

    let groups = result.steps()[0].exit_conditions();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].operator(), Operator::Or);

    let programs: Vec<Option<&str>> = result
        .cross_references()
        .iter()
        .map(|reference| reference.target_program())
        .collect();
    assert_eq!(
        programs,
        vec![Some("Füllen Horde N21"), Some("Füllen Horde N22")]
    );
    assert!(
        result
            .cross_references()
            .iter()
            .all(|reference| reference.target_steps() == [7])
    );
}

#[test]
fn test_duplicate_step_numbers() {
    let source = "SCHRITT 3: a\nx\nSCHRITT 3: b\ny";

    let result = parse(source, &ParseContext::default(), &SyntaxRules::default())
        .expect("Failed to compile rules");

    assert_eq!(result.steps().len(), 2);
    assert_eq!(result.errors().len(), 1);

    let error = &result.errors()[0];
    assert_eq!(error.severity(), Severity::Error);
    assert_eq!(error.code(), Some(ErrorCode::E100));
    assert_eq!(error.line_number(), Some(3));
    assert!(error.labels().iter().any(|label| label.line() == 1));
}

#[test]
fn test_custom_keywords() {
    let rules = SyntaxRules::default()
        .with_idle_keywords(["GRUNDSTELLUNG"])
        .with_step_keywords(["TAKT"])
        .with_cross_reference_keywords(["TAKT"]);

    let source = "GRUNDSTELLUNG: Aus\nAnlage aus\nTAKT 1: Ein\nFreigabe (TAKT 1)";
    let result = parse(source, &ParseContext::default(), &rules).expect("Failed to compile rules");

    let kinds: Vec<StepKind> = result.steps().iter().map(|step| step.kind()).collect();
    assert_eq!(kinds, vec![StepKind::Idle, StepKind::Numbered]);
    assert_eq!(result.cross_references().len(), 1);
    assert!(result.warnings().is_empty());
}

#[test]
fn test_invalid_rules_are_rejected() {
    let empty = SyntaxRules::default().with_idle_keywords(Vec::<String>::new());
    assert!(matches!(
        CompiledRules::new(&empty),
        Err(ConfigError::EmptyKeywordSet("idle_keywords"))
    ));

    let blank = SyntaxRules::default().with_step_keywords(["SCHRITT", "  "]);
    assert!(matches!(
        CompiledRules::new(&blank),
        Err(ConfigError::BlankKeyword("step_keywords"))
    ));

    let pattern = SyntaxRules::default().with_hmi_pattern("HMI(");
    assert!(matches!(
        CompiledRules::new(&pattern),
        Err(ConfigError::InvalidPattern(_))
    ));
}

#[test]
fn test_compiled_rules_are_reusable() {
    let rules = CompiledRules::new(&SyntaxRules::default()).expect("Failed to compile rules");
    let context = ParseContext::new(SourceKind::DocumentExtract).with_program_name("Einfuhr");
    let validation = ValidationRules::default();

    let first = parse_with("SCHRITT 1: a\nx", &context, &rules, &validation);
    let second = parse_with("SCHRITT 1: a\nx\nSCHRITT 2: b\ny", &context, &rules, &validation);

    assert_eq!(first.statistics().total_steps(), 1);
    assert_eq!(second.statistics().total_steps(), 2);
    assert_eq!(second.metadata().program_name(), Some("Einfuhr"));
}

#[test]
fn test_normalize_is_public_and_idempotent() {
    let rules = CompiledRules::new(&SyntaxRules::default()).expect("Failed to compile rules");
    let text = "Ruhe. Start\r\n\tNicht Hand Schritt 2: Weiter\r\n";

    let once = normalize(text, &rules);
    assert_eq!(normalize(&once, &rules), once);
    assert!(once.contains("SCHRITT 2: Weiter"));
}
