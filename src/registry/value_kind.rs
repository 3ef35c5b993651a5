//! Value-kind inference from manifest type text.
//!
//! Type text is TypeScript-flavored: `boolean`, `number`, `'small' | 'large'`,
//! `string & {}` and so on. Only closed unions of string literals become enums.
//! Anything open-ended or unrecognized is unrestricted text.

use itertools::Itertools;

use super::types::ValueKind;

#[derive(Debug, PartialEq, Eq)]
enum Member {
    Nullish,
    OpenString,
    Boolean,
    Number,
    Literal(String),
    Other,
}

pub fn infer(type_text: Option<&str>) -> ValueKind {
    let Some(text) = type_text.map(str::trim).filter(|text| !text.is_empty()) else {
        return ValueKind::String;
    };

    let members: Vec<Member> = split_union(strip_outer_parens(text))
        .into_iter()
        .map(classify)
        .filter(|member| *member != Member::Nullish)
        .collect();

    if members.is_empty() || members.contains(&Member::OpenString) {
        return ValueKind::String;
    }

    if members.iter().all(|member| *member == Member::Boolean) {
        return ValueKind::Boolean;
    }

    if members.iter().all(|member| *member == Member::Number) {
        return ValueKind::Number;
    }

    if members.iter().all(|member| matches!(member, Member::Literal(_))) {
        let options = members
            .into_iter()
            .filter_map(|member| match member {
                Member::Literal(value) => Some(value),
                _ => None,
            })
            .unique()
            .collect();
        return ValueKind::Enum(options);
    }

    ValueKind::String
}

fn classify(member: &str) -> Member {
    let member = strip_outer_parens(member.trim());
    let compact: String = member.chars().filter(|c| !c.is_whitespace()).collect();

    match compact.as_str() {
        "undefined" | "null" | "void" => return Member::Nullish,
        "string" => return Member::OpenString,
        "boolean" | "true" | "false" => return Member::Boolean,
        "number" => return Member::Number,
        _ => {}
    }

    // `string & {}` and friends keep editor suggestions open-ended
    if compact.starts_with("string&") || compact.starts_with("(string&") {
        return Member::OpenString;
    }

    if let Some(literal) = string_literal(member) {
        return match literal.contains("${") {
            true => Member::OpenString,
            false => Member::Literal(literal.to_string()),
        };
    }

    if compact.parse::<f64>().is_ok() {
        return Member::Number;
    }

    Member::Other
}

fn string_literal(member: &str) -> Option<&str> {
    ['\'', '"', '`'].into_iter().find_map(|quote| {
        member
            .strip_prefix(quote)?
            .strip_suffix(quote)
            .filter(|inner| !inner.contains(quote))
    })
}

fn strip_outer_parens(text: &str) -> &str {
    let mut text = text.trim();
    while text.starts_with('(') && text.ends_with(')') && encloses_all(text) {
        text = text[1..text.len() - 1].trim();
    }
    text
}

/// True when the opening paren at index 0 closes at the last character.
fn encloses_all(text: &str) -> bool {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != text.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

/// Splits on `|` outside quotes and brackets.
fn split_union(text: &str) -> Vec<&str> {
    let mut members = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(' | '[' | '{' | '<') => depth += 1,
            (None, ')' | ']' | '}' | '>') => depth -= 1,
            (None, '|') if depth == 0 => {
                members.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    members.push(&text[start..]);

    members
        .into_iter()
        .map(str::trim)
        .filter(|member| !member.is_empty())
        .collect()
}
