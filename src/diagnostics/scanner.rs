//! Attribute scanning over raw opening-tag text.
//!
//! Structural attribute maps collapse duplicates and lose binding markers, so diagnostics
//! work from the text between `<tag` and `>` instead. The scanner never fails: a fragment
//! it cannot make sense of is skipped and scanning resumes after it.

use std::ops::Range;

/// One `name` or `name=value` occurrence, offsets absolute within the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeOccurrence<'a> {
    /// The name as written, binding marker included
    pub name: &'a str,
    pub name_range: Range<usize>,
    pub value: Option<AttributeValue<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue<'a> {
    /// Value text without the surrounding quotes
    pub text: &'a str,
    /// Range of the value including quotes
    pub range: Range<usize>,
    pub quote: Option<char>,
}

impl AttributeValue<'_> {
    /// True when the value holds a template interpolation rather than literal text.
    pub fn is_interpolated(&self) -> bool {
        self.text.contains("${") || self.text.contains("{{")
    }

    /// The literal inside a bound expression such as `'primary'` or `"primary"`, if the
    /// expression is nothing but a string literal.
    pub fn string_literal(&self) -> Option<&str> {
        let text = self.text.trim();
        let mut chars = text.chars();
        let first = chars.next()?;
        let last = chars.next_back()?;
        if first == last && matches!(first, '\'' | '"' | '`') {
            let inner = &text[1..text.len() - 1];
            (!inner.contains(first) && !inner.contains("${")).then_some(inner)
        } else {
            None
        }
    }
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'' | '<')
}

/// Scans the attributes of the opening tag occupying `open_tag` in `text`.
pub fn scan_attributes(text: &str, open_tag: Range<usize>) -> Vec<AttributeOccurrence<'_>> {
    let Some(tag_text) = text.get(open_tag.clone()) else {
        return vec![];
    };
    let base = open_tag.start;

    // skip `<` and the tag name
    let mut pos = tag_text
        .char_indices()
        .skip(1)
        .find(|(_, c)| !is_name_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(tag_text.len());

    let mut occurrences = vec![];
    while pos < tag_text.len() {
        let rest = &tag_text[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        if c.is_whitespace() || c == '/' {
            pos += c.len_utf8();
            continue;
        }
        if c == '>' {
            break;
        }
        if !is_name_char(c) {
            // stray quote or `=` with no name before it
            pos = skip_fragment(tag_text, pos);
            continue;
        }

        let name_len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
        let name_range = pos..pos + name_len;
        pos += name_len;

        let after_name = skip_whitespace(tag_text, pos);
        let value = if tag_text[after_name..].starts_with('=') {
            let value_start = skip_whitespace(tag_text, after_name + 1);
            match scan_value(tag_text, value_start) {
                Some((value, end)) => {
                    pos = end;
                    Some(value)
                }
                None => {
                    tracing::debug!(
                        attribute = &tag_text[name_range.clone()],
                        "unterminated attribute value, skipping"
                    );
                    pos = skip_fragment(tag_text, value_start);
                    continue;
                }
            }
        } else {
            None
        };

        occurrences.push(AttributeOccurrence {
            name: &tag_text[name_range.clone()],
            name_range: base + name_range.start..base + name_range.end,
            value: value.map(|value| AttributeValue {
                text: value.text,
                range: base + value.range.start..base + value.range.end,
                quote: value.quote,
            }),
        });
    }

    occurrences
}

fn skip_whitespace(text: &str, pos: usize) -> usize {
    text[pos..]
        .find(|c: char| !c.is_whitespace())
        .map_or(text.len(), |offset| pos + offset)
}

/// Advances past the current fragment to the next whitespace.
fn skip_fragment(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    let first = rest.chars().next().map_or(0, char::len_utf8);
    rest[first..]
        .find(char::is_whitespace)
        .map_or(text.len(), |offset| pos + first + offset)
}

/// Reads a value starting at `start`, returning it with the offset just past it.
fn scan_value(text: &str, start: usize) -> Option<(AttributeValue<'_>, usize)> {
    let rest = &text[start..];
    let first = rest.chars().next()?;

    match first {
        '"' | '\'' => {
            let close = rest[1..].find(first)? + 1;
            Some((
                AttributeValue {
                    text: &rest[1..close],
                    range: start..start + close + 1,
                    quote: Some(first),
                },
                start + close + 1,
            ))
        }
        '>' => None,
        _ => {
            let len = unquoted_len(rest)?;
            Some((
                AttributeValue {
                    text: &rest[..len],
                    range: start..start + len,
                    quote: None,
                },
                start + len,
            ))
        }
    }
}

/// Unquoted values end at whitespace or `>`, except inside `{…}` interpolations.
fn unquoted_len(rest: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && (c.is_whitespace() || c == '>') => return Some(i),
            _ => {}
        }
    }
    (depth == 0).then_some(rest.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(tag: &str) -> Vec<AttributeOccurrence<'_>> {
        scan_attributes(tag, 0..tag.len())
    }

    #[test]
    fn test_scan_forms() {
        let tag = r#"<x-button disabled variant="primary" size='2' label=plain>"#;
        let occurrences = scan(tag);
        let names: Vec<_> = occurrences.iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["disabled", "variant", "size", "label"]);

        assert_eq!(occurrences[0].value, None);
        let variant = occurrences[1].value.as_ref().unwrap();
        assert_eq!(variant.text, "primary");
        assert_eq!(variant.quote, Some('"'));
        assert_eq!(&tag[variant.range.clone()], r#""primary""#);
        assert_eq!(occurrences[2].value.as_ref().unwrap().text, "2");
        assert_eq!(occurrences[3].value.as_ref().unwrap().text, "plain");
    }

    #[test]
    fn test_offsets_are_absolute() {
        let text = r#"<p>hi</p><x-a  foo="1" foo = "2"></x-a>"#;
        let start = text.find("<x-a").unwrap();
        let end = text.find("></x-a>").unwrap() + 1;
        let occurrences = scan_attributes(text, start..end);
        assert_eq!(occurrences.len(), 2);
        assert_eq!(&text[occurrences[1].name_range.clone()], "foo");
        assert_eq!(occurrences[1].name_range.start, text.find(r#"foo = "2""#).unwrap());
        assert_eq!(occurrences[1].value.as_ref().unwrap().text, "2");
    }

    #[test]
    fn test_binding_markers_are_part_of_name() {
        let tag = r#"<x-a .value=${v} ?disabled=${d} @click=${h} [attr.size]="s" (change)="f()" :variant="'a'">"#;
        let names: Vec<_> = scan(tag).iter().map(|o| o.name).collect();
        assert_eq!(
            names,
            vec![".value", "?disabled", "@click", "[attr.size]", "(change)", ":variant"]
        );
    }

    #[test]
    fn test_interpolation_with_spaces_stays_one_value() {
        let tag = "<x-a .value=${a + b} open>";
        let occurrences = scan(tag);
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].value.as_ref().unwrap().text, "${a + b}");
        assert!(occurrences[0].value.as_ref().unwrap().is_interpolated());
        assert_eq!(occurrences[1].name, "open");
    }

    #[test]
    fn test_malformed_fragments_are_skipped() {
        let tag = r#"<x-a "stray" good="1" =oops other>"#;
        let names: Vec<_> = scan(tag).iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["good", "other"]);

        let unterminated = r#"<x-a first="1" broken="oops second>"#;
        let names: Vec<_> = scan(unterminated).iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_self_closing_tag() {
        let names: Vec<_> = scan("<x-a open />").iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["open"]);
    }

    #[test]
    fn test_string_literal() {
        let value = |text| AttributeValue {
            text,
            range: 0..0,
            quote: Some('"'),
        };
        assert_eq!(value("'primary'").string_literal(), Some("primary"));
        assert_eq!(value("`danger`").string_literal(), Some("danger"));
        assert_eq!(value("isPrimary ? 'a' : 'b'").string_literal(), None);
        assert_eq!(value("'").string_literal(), None);
    }
}
