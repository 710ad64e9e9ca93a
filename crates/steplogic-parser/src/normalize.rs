//! Text normalization.
//!
//! Raw input arrives with mixed line endings, tab/space indentation, stray
//! mis-decoded characters and keywords written in many shapes
//! (`Schritt-3.`, `STAP 4 :`, `... RUHE: ...` glued onto another line).
//! Normalization rewrites the buffer line by line in four passes:
//!
//! 1. line endings (`\r\n` and lone `\r` become `\n`)
//! 2. encoding repair, applied until the line stops changing
//! 3. whitespace (indentation kept with tabs as four spaces, internal runs
//!    collapsed, trailing whitespace trimmed)
//! 4. keyword formatting (embedded declarations split onto their own line,
//!    declarations and `FROM STEP n` sources canonicalized)
//!
//! Each output line remembers the 1-based number of the input line it came
//! from, so diagnostics always point at the text the user wrote. The passes
//! are idempotent: normalizing normalized text changes nothing.

use log::trace;

use crate::rules::CompiledRules;

/// Upper bound on encoding-repair rounds per line.
const MAX_REPAIR_ROUNDS: usize = 8;

const TAB_WIDTH: usize = 4;

/// One normalized line and the original line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    number: usize,
    text: String,
}

impl SourceLine {
    /// Create a line with its 1-based original line number.
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// The 1-based line number in the original input.
    pub fn number(&self) -> usize {
        self.number
    }

    /// The normalized text, including indentation.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text without indentation.
    pub fn content(&self) -> &str {
        self.text.trim_start()
    }

    /// The indentation width in columns.
    pub fn indent(&self) -> usize {
        self.text.len() - self.content().len()
    }

    /// Returns `true` if the line holds no text.
    pub fn is_blank(&self) -> bool {
        self.content().is_empty()
    }
}

/// Normalize a raw text buffer.
///
/// # Example
///
/// ```
/// # use steplogic_core::syntax::SyntaxRules;
/// # use steplogic_parser::{CompiledRules, normalize::normalize};
/// let rules = CompiledRules::new(&SyntaxRules::default()).expect("default rules");
///
/// let text = normalize("Schritt-3.  Start\r\nFertig RUHE: Warten", &rules);
/// assert_eq!(text, "SCHRITT 3: Start\nFertig\nRUHE: Warten");
/// assert_eq!(normalize(&text, &rules), text);
/// ```
pub fn normalize(text: &str, rules: &CompiledRules) -> String {
    normalize_lines(text, rules)
        .iter()
        .map(SourceLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize a raw text buffer into lines tagged with original line numbers.
///
/// A line holding several declarations yields several output lines that
/// share one line number.
pub fn normalize_lines(text: &str, rules: &CompiledRules) -> Vec<SourceLine> {
    let text = normalize_line_endings(text);

    let lines: Vec<SourceLine> = text
        .split('\n')
        .enumerate()
        .flat_map(|(index, line)| {
            let line = repair_encoding(line, rules);
            let line = normalize_whitespace(&line);
            format_keywords(index + 1, &line, rules)
        })
        .collect();

    trace!(lines = lines.len(); "Normalized input");
    lines
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn repair_encoding(line: &str, rules: &CompiledRules) -> String {
    let mut text = line.to_string();
    for _ in 0..MAX_REPAIR_ROUNDS {
        let repaired = rules
            .encoding_repairs()
            .fold(text.clone(), |acc, (broken, replacement)| {
                acc.replace(broken, replacement)
            });
        if repaired == text {
            break;
        }
        text = repaired;
    }
    text
}

fn normalize_whitespace(line: &str) -> String {
    let mut indent = 0;
    for ch in line.chars() {
        match ch {
            '\t' => indent += TAB_WIDTH,
            ch if ch.is_whitespace() => indent += 1,
            _ => break,
        }
    }

    let content = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if content.is_empty() {
        return String::new();
    }
    format!("{}{}", " ".repeat(indent), content)
}

fn format_keywords(number: usize, line: &str, rules: &CompiledRules) -> Vec<SourceLine> {
    split_embedded(line, rules)
        .into_iter()
        .map(|piece| {
            let text = rules
                .canonical_declaration(&piece)
                .or_else(|| rules.canonical_from_declaration(&piece))
                .unwrap_or(piece);
            SourceLine::new(number, text)
        })
        .collect()
}

/// Split a line before every declaration keyword that is not line-initial
/// and not inside parentheses.
fn split_embedded(line: &str, rules: &CompiledRules) -> Vec<String> {
    let content_start = line.len() - line.trim_start().len();
    let mut splits = Vec::new();
    let mut depth = 0usize;
    let mut scanned = 0;

    for start in rules.embedded_declarations(line) {
        if start <= content_start {
            continue;
        }
        depth = line[scanned..start].chars().fold(depth, |depth, ch| match ch {
            '(' => depth + 1,
            ')' => depth.saturating_sub(1),
            _ => depth,
        });
        scanned = start;
        if depth == 0 {
            splits.push(start);
        }
    }

    if splits.is_empty() {
        return vec![line.to_string()];
    }

    let mut pieces = Vec::with_capacity(splits.len() + 1);
    let head = line[..splits[0]].trim_end();
    // A prefix of list markers belongs to nothing once the declaration moves out.
    if head.chars().any(char::is_alphanumeric) {
        pieces.push(head.to_string());
    }
    for (index, &start) in splits.iter().enumerate() {
        let end = splits.get(index + 1).copied().unwrap_or(line.len());
        pieces.push(line[start..end].trim_end().to_string());
    }
    pieces
}
