//! Best-effort positions inside manifest text.
//!
//! Entries are found by literal substring search on a key such as `"tagName": "x-button"`.
//! There is no structural lookup: when the same text occurs more than once, the first
//! occurrence wins. Two components sharing an attribute name therefore resolve to the
//! first one's entry.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{Position, Range};

/// Byte offset of the first occurrence of `key`, or 0 when absent.
pub fn locate(text: &str, key: &str) -> usize {
    find(text, key).unwrap_or(0)
}

pub fn find(text: &str, key: &str) -> Option<usize> {
    if key.is_empty() {
        return None;
    }
    text.find(key)
}

/// The first offset matched by any of `keys`, tried in order.
pub fn find_any<S: AsRef<str>>(text: &str, keys: &[S]) -> Option<usize> {
    keys.iter().find_map(|key| find(text, key.as_ref()))
}

/// Search keys for a JSON string field, in pretty-printed and compact form.
pub fn field_keys(field: &str, value: &str) -> [String; 2] {
    [
        format!("\"{field}\": \"{value}\""),
        format!("\"{field}\":\"{value}\""),
    ]
}

/// First offsets of every `"tagName"` / `"name"` string field in a manifest.
///
/// Built in one pass so indexing a large manifest does not search the text once per
/// entry. Lookups return the same first occurrence a literal search would.
#[derive(Debug, Default)]
pub struct FieldIndex {
    first: HashMap<(String, String), usize>,
}

impl FieldIndex {
    pub fn build(text: &str) -> FieldIndex {
        static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r#""(?<field>tagName|name)"\s*:\s*"(?<value>(?:[^"\\]|\\.)*)""#).unwrap()
        });

        let mut first = HashMap::new();
        for captures in FIELD_RE.captures_iter(text) {
            let (Some(whole), Some(field), Some(value)) = (
                captures.get(0),
                captures.name("field"),
                captures.name("value"),
            ) else {
                continue;
            };
            first
                .entry((field.as_str().to_string(), value.as_str().to_string()))
                .or_insert(whole.start());
        }

        FieldIndex { first }
    }

    pub fn lookup(&self, field: &str, value: &str) -> Option<usize> {
        self.first
            .get(&(field.to_string(), value.to_string()))
            .copied()
    }
}

/// Converts a byte offset to a zero-based line and UTF-16 column with one pass over lines.
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let offset = offset.min(text.len());
    let mut line_start = 0;
    let mut line = 0u32;

    for (i, _) in text.match_indices('\n') {
        if i >= offset {
            break;
        }
        line += 1;
        line_start = i + 1;
    }

    let column_text = text.get(line_start..offset).unwrap_or_default();
    Position {
        line,
        character: column_text.encode_utf16().count() as u32,
    }
}

/// Range covering `len` bytes starting at `offset`.
pub fn offset_range(text: &str, offset: usize, len: usize) -> Range {
    Range {
        start: offset_to_position(text, offset),
        end: offset_to_position(text, offset + len),
    }
}

/// Range of the `"field": "value"` entry starting at `offset`, or an empty range there
/// when no entry starts at it.
pub fn field_range(text: &str, offset: usize) -> Range {
    static ENTRY_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"^"[^"]*"\s*:\s*"(?:[^"\\]|\\.)*""#).unwrap());

    let len = text
        .get(offset..)
        .and_then(|rest| ENTRY_RE.find(rest))
        .map_or(0, |entry| entry.end());
    offset_range(text, offset, len)
}
