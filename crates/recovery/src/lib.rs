//! # FLEX Recovery
//!
//! Extracts a JSON value from text that was supposed to be JSON but often is
//! not: model replies wrapped in code fences, prefixed with prose, or cut off
//! with trailing commentary.
//!
//! ## Phases
//!
//! ```text
//! raw text
//!     │
//!     ├──> 1. Direct      parse the text verbatim
//!     ├──> 2. Extracted   ```lang { ... }``` block, else the first balanced
//!     │                   top-level { ... } anywhere
//!     ├──> 3. Bracketed   first '{' .. last '}'
//!     └──> 4. LineTrimmed phase-3 slice, dropping trailing lines until it parses
//! ```
//!
//! Phases run in order and the first success wins. Every phase starts from
//! the original text (phase 4 from the phase-3 slice), so a failed phase never
//! changes what a later phase sees. When nothing parses the outcome is
//! [`Recovery::NotFound`]; callers are expected to degrade, not fail.
//!
//! ## Example
//!
//! ```rust
//! use flex_recovery::recover;
//! use serde_json::json;
//!
//! let reply = "Sure! Here it is:\n```json\n{\"a\": 1}\n```";
//! assert_eq!(recover(reply), Some(json!({"a": 1})));
//! assert_eq!(recover("not json at all"), None);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCED_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+.\-]*\s*(\{.*?\})\s*```").expect("fenced object pattern")
});

/// Strategy that produced a recovered value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Direct,
    Extracted,
    Bracketed,
    LineTrimmed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Direct => "direct",
            Phase::Extracted => "extracted",
            Phase::Bracketed => "bracketed",
            Phase::LineTrimmed => "line_trimmed",
        }
    }
}

/// Outcome of a recovery attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery {
    Found { value: Value, phase: Phase },
    NotFound,
}

impl Recovery {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Recovery::Found { phase, .. } => Some(*phase),
            Recovery::NotFound => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Recovery::Found { value, .. } => Some(value),
            Recovery::NotFound => None,
        }
    }
}

type PhaseFn = fn(&str) -> Option<Value>;

const PHASES: [(Phase, PhaseFn); 4] = [
    (Phase::Direct, parse_direct),
    (Phase::Extracted, parse_extracted),
    (Phase::Bracketed, parse_bracketed),
    (Phase::LineTrimmed, parse_line_trimmed),
];

/// Recover a JSON value from `text`, or `None` when every phase fails
pub fn recover(text: &str) -> Option<Value> {
    recover_with_phase(text).into_value()
}

/// Recover a JSON value and report which phase produced it
pub fn recover_with_phase(text: &str) -> Recovery {
    for (phase, attempt) in PHASES {
        if let Some(value) = attempt(text) {
            log::debug!("Recovered JSON via {} phase", phase.as_str());
            return Recovery::Found { value, phase };
        }
    }

    log::debug!(
        "No JSON recoverable from {} chars of text",
        text.chars().count()
    );
    Recovery::NotFound
}

fn parse(candidate: &str) -> Option<Value> {
    serde_json::from_str(candidate).ok()
}

fn parse_direct(text: &str) -> Option<Value> {
    parse(text)
}

fn parse_extracted(text: &str) -> Option<Value> {
    if let Some(captures) = FENCED_OBJECT.captures(text) {
        if let Some(value) = captures.get(1).and_then(|m| parse(m.as_str())) {
            return Some(value);
        }
    }

    first_balanced_object(text)
}

/// Scan `{` positions left to right. A balanced candidate that fails to parse
/// is skipped whole, so objects nested inside it are never returned.
fn first_balanced_object(text: &str) -> Option<Value> {
    let mut from = 0;
    while let Some(found) = text[from..].find('{') {
        let start = from + found;
        match balanced_object_at(text, start) {
            Some(candidate) => match parse(candidate) {
                Some(value) => return Some(value),
                None => from = start + candidate.len(),
            },
            None => from = start + 1,
        }
    }
    None
}

fn parse_bracketed(text: &str) -> Option<Value> {
    bracketed_slice(text).and_then(parse)
}

fn parse_line_trimmed(text: &str) -> Option<Value> {
    let slice = bracketed_slice(text)?;
    let lines: Vec<&str> = slice.lines().collect();
    (1..=lines.len())
        .rev()
        .find_map(|keep| parse(&lines[..keep].join("\n")))
}

/// Slice from the first `{` to the last `}`, inclusive
fn bracketed_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// The `{ ... }` opening at byte `start` whose braces balance, ignoring
/// braces inside strings
fn balanced_object_at(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
