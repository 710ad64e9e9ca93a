//! Compiled matchers for a syntax rule table.
//!
//! A [`SyntaxRules`] table only lists keyword synonyms. [`CompiledRules`]
//! turns every set into a case-insensitive alternation (escaped, longest
//! keyword first) and builds the line patterns of each parsing phase from
//! them. Compilation happens once per configuration; the result is
//! immutable and can be shared across threads.

use std::{collections::HashMap, ops::Range};

use log::debug;
use regex::{Regex, RegexBuilder};
use steplogic_core::{
    model::{StepKind, TimeSpec, TimeUnit},
    syntax::SyntaxRules,
};

use crate::error::ConfigError;

/// A step declaration recognized at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeclarationMatch<'a> {
    pub kind: StepKind,
    pub number: Option<u32>,
    pub description: &'a str,
}

/// A time literal found inside a condition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TimeMatch {
    pub spec: TimeSpec,
    pub range: Range<usize>,
}

/// Matchers compiled from a [`SyntaxRules`] table.
///
/// # Example
///
/// ```
/// # use steplogic_core::syntax::SyntaxRules;
/// # use steplogic_parser::CompiledRules;
/// let rules = CompiledRules::new(&SyntaxRules::default()).expect("default rules compile");
///
/// let broken = SyntaxRules::default().with_step_keywords(Vec::<String>::new());
/// assert!(CompiledRules::new(&broken).is_err());
/// # drop(rules);
/// ```
#[derive(Debug, Clone)]
pub struct CompiledRules {
    declaration: Regex,
    numbered_declaration: Regex,
    unnumbered_declaration: Regex,
    idle_declaration: Regex,
    embedded_declaration: Regex,
    from_declaration: Option<Regex>,
    negation: Option<Regex>,
    set: Option<Regex>,
    set_reference: Option<Regex>,
    reset: Option<Regex>,
    latch_header: Option<Regex>,
    reference_keyword: Option<Regex>,
    reference_clause: Option<Regex>,
    step_operand: Option<Regex>,
    time: Option<Regex>,
    time_units: HashMap<String, TimeUnit>,
    hmi: Regex,
    encoding_repairs: Vec<(String, String)>,
}

impl CompiledRules {
    /// Compile a rule table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the idle or step keyword set is empty,
    /// a keyword is blank, or the HMI pattern is not a valid expression.
    pub fn new(rules: &SyntaxRules) -> Result<Self, ConfigError> {
        let idle = required("idle_keywords", rules.idle_keywords())?;
        let step = required("step_keywords", rules.step_keywords())?;
        let negation = alternation("negation_keywords", rules.negation_keywords())?;
        let reference = alternation("cross_reference_keywords", rules.cross_reference_keywords())?;
        let set = alternation("set_keywords", rules.set_keywords())?;
        let reset = alternation("reset_keywords", rules.reset_keywords())?;
        let from = alternation("from_keywords", rules.from_keywords())?;
        let latch = alternation("latch_keywords", rules.latch_keywords())?;
        let units: Vec<String> = rules.time_units().keys().cloned().collect();
        let units = alternation("time_units", &units)?;

        let optional = |pattern: Option<String>| pattern.as_deref().map(compile).transpose();

        let compiled = Self {
            declaration: compile(&format!(
                r"^\s*(?:(?P<idle>{idle})|(?P<step>{step}))(?:\s+(?P<number>\d{{1,9}}))?\s*:\s*(?P<description>.*)$"
            ))?,
            numbered_declaration: compile(&format!(
                r"^\s*(?P<keyword>{step})\s*[-.]?\s*(?P<number>\d{{1,9}})\s*[:.]\s*(?P<rest>.*)$"
            ))?,
            unnumbered_declaration: compile(&format!(
                r"^\s*(?P<keyword>{step})\s*:\s*(?P<rest>.*)$"
            ))?,
            idle_declaration: compile(&format!(
                r"^\s*(?P<keyword>{idle})(?:\s*[-.]?\s*(?P<number>\d{{1,9}}))?\s*[:.]\s*(?P<rest>.*)$"
            ))?,
            embedded_declaration: compile(&format!(
                r"\b(?:{idle}|{step})(?:\s*[-.]?\s*\d{{1,9}})?\s*:"
            ))?,
            from_declaration: optional(from.as_ref().zip(reference.as_ref()).map(|(from, reference)| {
                format!(
                    r"^(?P<indent>\s*)(?P<source>\+?\s*(?:{from})\s+(?:{reference})\s+\d[\d\s+\-]*?)\s*$"
                )
            }))?,
            negation: optional(negation.map(|negation| format!(r"^(?:{negation})\s+(?P<rest>\S.*)$")))?,
            set: optional(set.as_ref().map(|set| format!(r"^(?:{set})\b\s*(?P<rest>.*)$")))?,
            set_reference: optional(set.map(|set| format!(r"^(?:{set})-\S")))?,
            reset: optional(reset.map(|reset| format!(r"^(?:{reset})\b\s*(?P<rest>.*)$")))?,
            latch_header: optional(
                latch.map(|latch| format!(r"^(?:{latch})\s*:\s*(?P<variable>.*?)\s*=$")),
            )?,
            reference_keyword: optional(reference.as_ref().map(|reference| format!(r"\b(?:{reference})\b")))?,
            reference_clause: optional(reference.as_ref().map(|reference| {
                format!(r"^(?:(?P<program>.*?)\s+)?(?:{reference})\s+(?P<steps>.+)$")
            }))?,
            step_operand: optional(reference.map(|reference| {
                let from = from.map(|from| format!(r"(?:(?:{from})\s+)?")).unwrap_or_default();
                format!(r"^{from}(?:{reference})\s+(?P<steps>\d.*)$")
            }))?,
            time: optional(units.map(|units| {
                format!(r"\b(?P<value>\d+(?:[.,]\d+)?)\s?(?P<unit>{units})\b")
            }))?,
            time_units: rules
                .time_units()
                .iter()
                .map(|(abbreviation, unit)| (abbreviation.trim().to_lowercase(), *unit))
                .collect(),
            hmi: compile(rules.hmi_pattern())?,
            encoding_repairs: rules
                .encoding_repairs()
                .iter()
                .filter(|repair| !repair.broken().is_empty())
                .map(|repair| (repair.broken().to_string(), repair.replacement().to_string()))
                .collect(),
        };

        debug!(
            idle_keywords = rules.idle_keywords().len(),
            step_keywords = rules.step_keywords().len(),
            time_units = compiled.time_units.len();
            "Syntax rules compiled"
        );

        Ok(compiled)
    }

    /// Match a step declaration (`KEYWORD [n]: description`).
    pub(crate) fn declaration<'a>(&self, text: &'a str) -> Option<DeclarationMatch<'a>> {
        let caps = self.declaration.captures(text)?;
        let kind = if caps.name("idle").is_some() {
            StepKind::Idle
        } else {
            StepKind::Numbered
        };
        let number = match caps.name("number") {
            Some(digits) => Some(digits.as_str().parse().ok()?),
            None => None,
        };
        let description = caps.name("description").map_or("", |m| m.as_str()).trim();

        Some(DeclarationMatch {
            kind,
            number,
            description,
        })
    }

    /// Rewrite a line-initial declaration into canonical `KEYWORD n: rest` form.
    pub(crate) fn canonical_declaration(&self, text: &str) -> Option<String> {
        if let Some(caps) = self.numbered_declaration.captures(text) {
            return Some(canonical(&caps["keyword"], Some(&caps["number"]), &caps["rest"]));
        }
        if let Some(caps) = self.unnumbered_declaration.captures(text) {
            return Some(canonical(&caps["keyword"], Some("1"), &caps["rest"]));
        }
        let caps = self.idle_declaration.captures(text)?;
        Some(canonical(
            &caps["keyword"],
            caps.name("number").map(|m| m.as_str()),
            &caps["rest"],
        ))
    }

    /// Byte offsets at which a declaration keyword starts inside `text`.
    pub(crate) fn embedded_declarations<'a>(&'a self, text: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.embedded_declaration.find_iter(text).map(|m| m.start())
    }

    /// Uppercase a `[+] FROM STEP n` transition source line.
    pub(crate) fn canonical_from_declaration(&self, text: &str) -> Option<String> {
        let caps = self.from_declaration.as_ref()?.captures(text)?;
        Some(format!("{}{}", &caps["indent"], caps["source"].to_uppercase()))
    }

    /// Strip a leading negation keyword.
    pub(crate) fn strip_negation<'a>(&self, text: &'a str) -> Option<&'a str> {
        operand(self.negation.as_ref(), text)
    }

    /// The operand of a SET keyword line.
    pub(crate) fn set_operand<'a>(&self, text: &'a str) -> Option<&'a str> {
        operand(self.set.as_ref(), text)
    }

    /// The operand of a RESET keyword line.
    pub(crate) fn reset_operand<'a>(&self, text: &'a str) -> Option<&'a str> {
        operand(self.reset.as_ref(), text)
    }

    /// Whether the text names the set conditions of a latch (`SETZEN-Bedingungen`).
    pub(crate) fn is_set_reference(&self, text: &str) -> bool {
        self.set_reference
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }

    /// Whether the line opens the SET or RESET part of a latch block.
    pub(crate) fn opens_latch_part(&self, text: &str) -> bool {
        self.set_operand(text).is_some() || self.reset_operand(text).is_some()
    }

    /// The variable of a `KEYWORD: variable =` latch header.
    pub(crate) fn latch_header_variable<'a>(&self, text: &'a str) -> Option<&'a str> {
        let caps = self.latch_header.as_ref()?.captures(text)?;
        caps.name("variable").map(|m| m.as_str())
    }

    /// Whether the text contains a cross-reference keyword.
    pub(crate) fn has_reference_keyword(&self, text: &str) -> bool {
        self.reference_keyword
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }

    /// Split a reference clause into `(program, step expression)`.
    pub(crate) fn reference_clause<'a>(&self, text: &'a str) -> Option<(Option<&'a str>, &'a str)> {
        let caps = self.reference_clause.as_ref()?.captures(text)?;
        let program = caps
            .name("program")
            .map(|m| m.as_str().trim())
            .filter(|program| !program.is_empty());
        let steps = caps.name("steps")?.as_str();
        Some((program, steps))
    }

    /// The step expression of a bare `[FROM] STEP expr` operand line.
    pub(crate) fn step_operand<'a>(&self, text: &'a str) -> Option<&'a str> {
        let caps = self.step_operand.as_ref()?.captures(text)?;
        caps.name("steps").map(|m| m.as_str())
    }

    /// Find the first time literal (`10sek`, `1,5 min`) in the text.
    pub(crate) fn find_time(&self, text: &str) -> Option<TimeMatch> {
        let pattern = self.time.as_ref()?;
        pattern.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            let value: f64 = caps["value"].replace(',', ".").parse().ok()?;
            let unit = *self.time_units.get(&caps["unit"].to_lowercase())?;
            Some(TimeMatch {
                spec: TimeSpec::new(value, unit),
                range: whole.range(),
            })
        })
    }

    /// Whether a variable name follows the HMI-input naming convention.
    pub(crate) fn is_hmi(&self, name: &str) -> bool {
        self.hmi.is_match(name)
    }

    /// Repairs as `(broken, replacement)` pairs; none has an empty `broken`.
    pub(crate) fn encoding_repairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.encoding_repairs
            .iter()
            .map(|(broken, replacement)| (broken.as_str(), replacement.as_str()))
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

fn operand<'a>(pattern: Option<&Regex>, text: &'a str) -> Option<&'a str> {
    let caps = pattern?.captures(text)?;
    caps.name("rest").map(|m| m.as_str().trim())
}

fn canonical(keyword: &str, number: Option<&str>, rest: &str) -> String {
    let mut line = keyword.to_uppercase();
    if let Some(number) = number {
        line.push(' ');
        line.push_str(number);
    }
    line.push(':');
    let rest = rest.trim();
    if !rest.is_empty() {
        line.push(' ');
        line.push_str(rest);
    }
    line
}

/// Build an escaped alternation, longest keyword first.
fn alternation(category: &'static str, keywords: &[String]) -> Result<Option<String>, ConfigError> {
    if keywords.iter().any(|keyword| keyword.trim().is_empty()) {
        return Err(ConfigError::BlankKeyword(category));
    }

    let mut keywords: Vec<&str> = keywords.iter().map(|keyword| keyword.trim()).collect();
    keywords.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    keywords.dedup();

    if keywords.is_empty() {
        return Ok(None);
    }
    let escaped: Vec<String> = keywords.into_iter().map(regex::escape).collect();
    Ok(Some(escaped.join("|")))
}

fn required(category: &'static str, keywords: &[String]) -> Result<String, ConfigError> {
    alternation(category, keywords)?.ok_or(ConfigError::EmptyKeywordSet(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> CompiledRules {
        CompiledRules::new(&SyntaxRules::default()).expect("default rules compile")
    }

    #[test]
    fn test_compiled_rules_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledRules>();
    }

    #[test]
    fn test_empty_step_keywords_rejected() {
        let table = SyntaxRules::default().with_step_keywords(Vec::<String>::new());
        let err = CompiledRules::new(&table).expect_err("empty set");
        assert!(matches!(err, ConfigError::EmptyKeywordSet("step_keywords")));
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let table = SyntaxRules::default().with_negation_keywords(["NICHT", "  "]);
        let err = CompiledRules::new(&table).expect_err("blank keyword");
        assert!(matches!(err, ConfigError::BlankKeyword("negation_keywords")));
    }

    #[test]
    fn test_invalid_hmi_pattern_rejected() {
        let table = SyntaxRules::default().with_hmi_pattern("HMI(");
        assert!(matches!(
            CompiledRules::new(&table),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_alternation_longest_first() {
        let keywords = ["SET".to_string(), "SETZEN".to_string(), "SET".to_string()];
        let pattern = alternation("set_keywords", &keywords).expect("valid");
        assert_eq!(pattern.as_deref(), Some("SETZEN|SET"));
    }

    #[test]
    fn test_declaration_matching() {
        let rules = rules();

        let idle = rules.declaration("RUHE: N10: Blockierung").expect("idle");
        assert_eq!(idle.kind, StepKind::Idle);
        assert_eq!(idle.number, None);
        assert_eq!(idle.description, "N10: Blockierung");

        let step = rules.declaration("schritt 12: Füllen").expect("step");
        assert_eq!(step.kind, StepKind::Numbered);
        assert_eq!(step.number, Some(12));
        assert_eq!(step.description, "Füllen");

        assert!(rules.declaration("SCHRITT 2-4").is_none());
        assert!(rules.declaration("Ruhezeit: 5").is_none());
    }

    #[test]
    fn test_canonical_declaration_forms() {
        let rules = rules();

        assert_eq!(
            rules.canonical_declaration("  Schritt-3. Start").as_deref(),
            Some("SCHRITT 3: Start")
        );
        assert_eq!(
            rules.canonical_declaration("STAP 4 : Einde").as_deref(),
            Some("STAP 4: Einde")
        );
        assert_eq!(
            rules.canonical_declaration("Step: first").as_deref(),
            Some("STEP 1: first")
        );
        assert_eq!(rules.canonical_declaration("rust:").as_deref(), Some("RUST:"));
        assert_eq!(rules.canonical_declaration("SCHRITT 2-4"), None);
    }

    #[test]
    fn test_negation_and_latch_operands() {
        let rules = rules();

        assert_eq!(rules.strip_negation("NICHT HMI01 HAND"), Some("HMI01 HAND"));
        assert_eq!(rules.strip_negation("Nichtig"), None);
        assert_eq!(rules.set_operand("SETZEN SCHRITT 4-5"), Some("SCHRITT 4-5"));
        assert_eq!(
            rules.reset_operand("RÜCKSETZEN NICHT SETZEN-Bedingungen"),
            Some("NICHT SETZEN-Bedingungen")
        );
        assert!(rules.is_set_reference("SETZEN-Bedingungen"));
        assert_eq!(
            rules.latch_header_variable("Störung: Einfuhrbahn nicht unten (T10-205) ="),
            Some("Einfuhrbahn nicht unten (T10-205)")
        );
    }

    #[test]
    fn test_reference_clause_split() {
        let rules = rules();

        assert_eq!(
            rules.reference_clause("Füllen Horde N21 SCHRITT 7"),
            Some((Some("Füllen Horde N21"), "7"))
        );
        assert_eq!(rules.reference_clause("SCHRITT 3"), Some((None, "3")));
        assert!(rules.has_reference_keyword("Sortentrennung SCHRITT 2"));
        assert!(!rules.has_reference_keyword("Stepper 2"));
        assert_eq!(rules.step_operand("VON SCHRITT 2-4"), Some("2-4"));
        assert_eq!(rules.step_operand("Schritte laufen"), None);
    }

    #[test]
    fn test_find_time() {
        let rules = rules();

        let found = rules.find_time("Zeit 10sek ??").expect("time literal");
        assert_eq!(found.spec, TimeSpec::new(10.0, TimeUnit::Seconds));
        assert_eq!(found.range, 5..10);

        let found = rules.find_time("Wartezeit 1,5 min").expect("decimal comma");
        assert_eq!(found.spec, TimeSpec::new(1.5, TimeUnit::Minutes));

        assert!(rules.find_time("Füllen Horde N21").is_none());
        assert!(rules.find_time("Pos 1 schließen").is_none());
    }

    #[test]
    fn test_hmi_pattern_case_insensitive() {
        let rules = rules();
        assert!(rules.is_hmi("hmi01 Hand"));
        assert!(!rules.is_hmi("Sicherheitsbereich 1 OK"));
    }
}
