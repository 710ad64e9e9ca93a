//! Syntax rule tables.
//!
//! [`SyntaxRules`] enumerates the keyword synonym sets of a description
//! dialect. The parser compiles a table once into matchers, so supporting a
//! new language dialect is a configuration change only. [`ValidationRules`]
//! holds the thresholds of the program-level checks.
//!
//! Both types implement [`serde::Deserialize`] with every field defaulted,
//! so a configuration file only needs to name the sets it overrides.
//!
//! # Example
//!
//! ```
//! # use steplogic_core::syntax::SyntaxRules;
//! let rules = SyntaxRules::default();
//! assert!(rules.step_keywords().iter().any(|k| k == "SCHRITT"));
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::model::TimeUnit;

/// A mis-decoded character sequence and its repair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EncodingRepair {
    from: String,
    to: String,
}

impl EncodingRepair {
    /// Create a repair mapping `from` onto `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The broken sequence.
    pub fn broken(&self) -> &str {
        &self.from
    }

    /// The replacement text.
    pub fn replacement(&self) -> &str {
        &self.to
    }
}

/// Keyword synonym sets and derived pattern inputs for one dialect family.
///
/// All keyword matching is case-insensitive. `idle_keywords` and
/// `step_keywords` must be non-empty; the other sets may be empty, which
/// disables the corresponding construct.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyntaxRules {
    idle_keywords: Vec<String>,
    step_keywords: Vec<String>,
    negation_keywords: Vec<String>,
    cross_reference_keywords: Vec<String>,
    set_keywords: Vec<String>,
    reset_keywords: Vec<String>,
    from_keywords: Vec<String>,
    latch_keywords: Vec<String>,
    time_units: BTreeMap<String, TimeUnit>,
    hmi_pattern: String,
    encoding_repairs: Vec<EncodingRepair>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|word| word.to_string()).collect()
}

impl Default for SyntaxRules {
    /// The German/Dutch/English dialect.
    fn default() -> Self {
        let time_units = [
            ("ms", TimeUnit::Milliseconds),
            ("msek", TimeUnit::Milliseconds),
            ("msec", TimeUnit::Milliseconds),
            ("s", TimeUnit::Seconds),
            ("sek", TimeUnit::Seconds),
            ("sec", TimeUnit::Seconds),
            ("sekunde", TimeUnit::Seconds),
            ("sekunden", TimeUnit::Seconds),
            ("seconde", TimeUnit::Seconds),
            ("seconden", TimeUnit::Seconds),
            ("second", TimeUnit::Seconds),
            ("seconds", TimeUnit::Seconds),
            ("min", TimeUnit::Minutes),
            ("minute", TimeUnit::Minutes),
            ("minuten", TimeUnit::Minutes),
            ("minuut", TimeUnit::Minutes),
            ("minutes", TimeUnit::Minutes),
            ("h", TimeUnit::Hours),
            ("std", TimeUnit::Hours),
            ("stunde", TimeUnit::Hours),
            ("stunden", TimeUnit::Hours),
            ("uur", TimeUnit::Hours),
            ("hour", TimeUnit::Hours),
            ("hours", TimeUnit::Hours),
        ]
        .into_iter()
        .map(|(abbreviation, unit)| (abbreviation.to_string(), unit))
        .collect();

        let encoding_repairs = [
            ("Ã¤", "ä"),
            ("Ã¶", "ö"),
            ("Ã¼", "ü"),
            ("Ã„", "Ä"),
            ("Ã–", "Ö"),
            ("Ãœ", "Ü"),
            ("ÃŸ", "ß"),
            ("Ã©", "é"),
            ("Ã¨", "è"),
            ("Ã«", "ë"),
            ("Ã¯", "ï"),
            ("â€“", "–"),
            ("â€™", "'"),
            ("\u{feff}", ""),
            ("\u{200b}", ""),
        ]
        .into_iter()
        .map(|(from, to)| EncodingRepair::new(from, to))
        .collect();

        Self {
            idle_keywords: words(&["RUHE", "RUST", "IDLE"]),
            step_keywords: words(&["SCHRITT", "STAP", "STEP"]),
            negation_keywords: words(&["NICHT", "NIET", "NOT"]),
            cross_reference_keywords: words(&["SCHRITT", "STAP", "STEP"]),
            set_keywords: words(&["SETZEN", "ZETTEN", "SET"]),
            reset_keywords: words(&["RÜCKSETZEN", "RUECKSETZEN", "RESETTEN", "RESET"]),
            from_keywords: words(&["VON", "VAN", "FROM"]),
            latch_keywords: words(&[
                "STÖRUNG", "STOERUNG", "MELDUNG", "STORING", "MELDING", "ALARM", "FAULT",
            ]),
            time_units,
            hmi_pattern: r"\bHMI\d*\b".to_string(),
            encoding_repairs,
        }
    }
}

impl SyntaxRules {
    /// Keywords introducing the idle (rest) state.
    pub fn idle_keywords(&self) -> &[String] {
        &self.idle_keywords
    }

    /// Keywords introducing a numbered step.
    pub fn step_keywords(&self) -> &[String] {
        &self.step_keywords
    }

    /// Keywords negating a condition.
    pub fn negation_keywords(&self) -> &[String] {
        &self.negation_keywords
    }

    /// Keywords introducing a step expression inside a cross-reference.
    pub fn cross_reference_keywords(&self) -> &[String] {
        &self.cross_reference_keywords
    }

    /// Keywords opening the SET part of a latch block.
    pub fn set_keywords(&self) -> &[String] {
        &self.set_keywords
    }

    /// Keywords opening the RESET part of a latch block.
    pub fn reset_keywords(&self) -> &[String] {
        &self.reset_keywords
    }

    /// Keywords of `FROM STEP <n>` transition sources.
    pub fn from_keywords(&self) -> &[String] {
        &self.from_keywords
    }

    /// Keywords of `KEYWORD: variable =` latch headers.
    pub fn latch_keywords(&self) -> &[String] {
        &self.latch_keywords
    }

    /// Time-unit abbreviations and their canonical unit.
    pub fn time_units(&self) -> &BTreeMap<String, TimeUnit> {
        &self.time_units
    }

    /// Regular expression matching HMI-input variable names.
    pub fn hmi_pattern(&self) -> &str {
        &self.hmi_pattern
    }

    /// Substitutions repairing upstream mis-decoding.
    pub fn encoding_repairs(&self) -> &[EncodingRepair] {
        &self.encoding_repairs
    }

    /// Replace the idle keyword set.
    pub fn with_idle_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.idle_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the step keyword set.
    pub fn with_step_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.step_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the negation keyword set.
    pub fn with_negation_keywords<S: Into<String>>(
        mut self,
        keywords: impl IntoIterator<Item = S>,
    ) -> Self {
        self.negation_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the cross-reference keyword set.
    pub fn with_cross_reference_keywords<S: Into<String>>(
        mut self,
        keywords: impl IntoIterator<Item = S>,
    ) -> Self {
        self.cross_reference_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the HMI naming pattern.
    pub fn with_hmi_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.hmi_pattern = pattern.into();
        self
    }
}

/// Thresholds of the configurable program-level checks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    max_step_number: Option<u32>,
    max_conditions_per_step: Option<usize>,
    require_description: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_step_number: None,
            max_conditions_per_step: None,
            require_description: true,
        }
    }
}

impl ValidationRules {
    /// Create validation rules.
    pub fn new(
        max_step_number: Option<u32>,
        max_conditions_per_step: Option<usize>,
        require_description: bool,
    ) -> Self {
        Self {
            max_step_number,
            max_conditions_per_step,
            require_description,
        }
    }

    /// Highest step number accepted without a warning.
    pub fn max_step_number(&self) -> Option<u32> {
        self.max_step_number
    }

    /// Most conditions a step may carry without a warning.
    pub fn max_conditions_per_step(&self) -> Option<usize> {
        self.max_conditions_per_step
    }

    /// Whether steps without a description are reported.
    pub fn require_description(&self) -> bool {
        self.require_description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_cover_all_dialects() {
        let rules = SyntaxRules::default();

        assert_eq!(rules.idle_keywords(), &["RUHE", "RUST", "IDLE"]);
        assert_eq!(rules.step_keywords(), &["SCHRITT", "STAP", "STEP"]);
        assert_eq!(rules.time_units().get("sek"), Some(&TimeUnit::Seconds));
        assert_eq!(rules.time_units().get("uur"), Some(&TimeUnit::Hours));
        assert!(!rules.encoding_repairs().is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let rules: SyntaxRules = toml::from_str(
            r#"
            step_keywords = ["STAP"]
            negation_keywords = ["NIET"]

            [time_units]
            sec = "seconds"
            "#,
        )
        .expect("valid rules");

        assert_eq!(rules.step_keywords(), &["STAP"]);
        assert_eq!(rules.negation_keywords(), &["NIET"]);
        assert_eq!(rules.idle_keywords(), SyntaxRules::default().idle_keywords());
        assert_eq!(rules.time_units().len(), 1);
    }

    #[test]
    fn test_validation_rules_from_toml() {
        let rules: ValidationRules =
            toml::from_str("max_step_number = 50\nrequire_description = false").expect("valid");

        assert_eq!(rules.max_step_number(), Some(50));
        assert_eq!(rules.max_conditions_per_step(), None);
        assert!(!rules.require_description());
    }
}
