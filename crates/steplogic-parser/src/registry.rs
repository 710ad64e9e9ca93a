//! Variable and timer registry.
//!
//! Every identifier read by a condition or written by an assignment or latch
//! is registered here. Names are deduplicated case-insensitively after
//! whitespace collapsing; the spelling of the first occurrence is kept.
//! Kinds are inferred once all usages are known:
//!
//! | Usage seen                       | Kind        |
//! |----------------------------------|-------------|
//! | any timed condition              | `Timer`     |
//! | name matches the HMI pattern     | `HmiInput`  |
//! | only read as a predicate         | `Boolean`   |
//! | written by assignment or latch   | `Marker`    |
//! | name without letters             | `Unknown`   |

use indexmap::IndexMap;
use steplogic_core::model::{Variable, VariableKind};

use crate::rules::CompiledRules;

/// How a condition or assignment uses an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Usage {
    /// Read as a plain predicate.
    Predicate,
    /// Read by a timed condition.
    Timed,
    /// Written by a transition assignment, optionally with an inline value.
    Assigned(Option<String>),
    /// Written by a latch block.
    Latched,
}

#[derive(Debug)]
struct Entry {
    name: String,
    first_seen_line: usize,
    value: Option<String>,
    usage_count: usize,
    timed: bool,
    written: bool,
}

/// Insertion-ordered registry keyed by normalized name.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: IndexMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one usage of `name` at `line`.
    ///
    /// Repeated registration increments the usage count; the earliest line
    /// is kept as the first occurrence.
    pub fn register(&mut self, name: &str, line: usize, usage: Usage) {
        let name = name.trim();
        let key = normalize_key(name);
        if key.is_empty() {
            return;
        }

        let entry = self.entries.entry(key).or_insert_with(|| Entry {
            name: name.to_string(),
            first_seen_line: line,
            value: None,
            usage_count: 0,
            timed: false,
            written: false,
        });

        entry.usage_count += 1;
        entry.first_seen_line = entry.first_seen_line.min(line);
        match usage {
            Usage::Predicate => {}
            Usage::Timed => entry.timed = true,
            Usage::Assigned(value) => {
                entry.written = true;
                if value.is_some() {
                    entry.value = value;
                }
            }
            Usage::Latched => entry.written = true,
        }
    }

    /// Number of distinct identifiers.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Finish the registry into variables ordered by first occurrence.
    pub fn into_variables(self, rules: &CompiledRules) -> Vec<Variable> {
        let mut variables: Vec<Variable> = self
            .entries
            .into_values()
            .map(|entry| {
                let kind = classify(&entry, rules);
                Variable::new(
                    entry.name,
                    kind,
                    entry.first_seen_line,
                    entry.value,
                    entry.usage_count,
                )
            })
            .collect();
        variables.sort_by_key(Variable::first_seen_line);
        variables
    }
}

fn classify(entry: &Entry, rules: &CompiledRules) -> VariableKind {
    if !entry.name.chars().any(char::is_alphabetic) {
        VariableKind::Unknown
    } else if entry.timed {
        VariableKind::Timer
    } else if rules.is_hmi(&entry.name) {
        VariableKind::HmiInput
    } else if entry.written {
        VariableKind::Marker
    } else {
        VariableKind::Boolean
    }
}

/// Lowercase and collapse internal whitespace.
pub(crate) fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
