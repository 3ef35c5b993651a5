//! Suppression directives read from markup comments.
//!
//! ```html
//! <!-- wctools-ignore -->                                 all rules, whole document
//! <!-- wctools-ignore unknownAttribute, invalidNumber --> listed rules, whole document
//! <!-- wctools-ignore-next-line deprecatedElement -->     listed rules, next element only
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::RuleId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSet {
    All,
    Rules(HashSet<RuleId>),
}

impl RuleSet {
    fn parse(list: &str) -> RuleSet {
        let names = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>();
        if names.is_empty() {
            return RuleSet::All;
        }

        RuleSet::Rules(
            names
                .into_iter()
                .filter_map(|name| match name.parse() {
                    Ok(rule) => Some(rule),
                    Err(err) => {
                        tracing::debug!(%err, "ignoring rule in suppression directive");
                        None
                    }
                })
                .collect(),
        )
    }

    pub fn contains(&self, rule: RuleId) -> bool {
        match self {
            RuleSet::All => true,
            RuleSet::Rules(rules) => rules.contains(&rule),
        }
    }

    fn merge(&mut self, other: RuleSet) {
        match (self, other) {
            (RuleSet::All, _) => {}
            (this, RuleSet::All) => *this = RuleSet::All,
            (RuleSet::Rules(rules), RuleSet::Rules(other)) => rules.extend(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Applies to every element in the document
    Document(RuleSet),
    /// Applies to the next element only
    NextElement(RuleSet),
}

static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*wctools-ignore(?<next>-next-line)?(?:\s+(?<rules>.*?))?\s*$").unwrap()
});

/// Parses the text inside `<!-- -->`. Comments that are not directives yield `None`.
pub fn parse_directive(comment: &str) -> Option<Directive> {
    let captures = DIRECTIVE_RE.captures(comment)?;
    let rules = RuleSet::parse(captures.name("rules").map_or("", |rules| rules.as_str()));

    Some(match captures.name("next") {
        Some(_) => Directive::NextElement(rules),
        None => Directive::Document(rules),
    })
}

/// Rules suppressed for a single element.
#[derive(Debug, Clone, Default)]
pub struct Suppressions {
    document: Option<RuleSet>,
    next_element: Option<RuleSet>,
}

impl Suppressions {
    pub fn is_suppressed(&self, rule: RuleId) -> bool {
        [&self.document, &self.next_element]
            .into_iter()
            .flatten()
            .any(|rules| rules.contains(rule))
    }
}

/// Tracks directives while walking a document's nodes in order.
#[derive(Debug, Default)]
pub struct SuppressionState {
    document: Option<RuleSet>,
    pending: Option<RuleSet>,
}

impl SuppressionState {
    /// Seeds document-wide directives, which apply regardless of where they appear.
    pub fn with_document_directives<'a>(comments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut state = SuppressionState::default();
        for directive in comments.into_iter().filter_map(parse_directive) {
            if let Directive::Document(rules) = directive {
                match &mut state.document {
                    Some(existing) => existing.merge(rules),
                    None => state.document = Some(rules),
                }
            }
        }
        state
    }

    pub fn comment(&mut self, text: &str) {
        if let Some(Directive::NextElement(rules)) = parse_directive(text) {
            match &mut self.pending {
                Some(existing) => existing.merge(rules),
                None => self.pending = Some(rules),
            }
        }
    }

    /// Suppressions for the element being entered; consumes any pending next-line directive.
    pub fn element(&mut self) -> Suppressions {
        Suppressions {
            document: self.document.clone(),
            next_element: self.pending.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directives() {
        assert_eq!(
            parse_directive(" wctools-ignore "),
            Some(Directive::Document(RuleSet::All))
        );
        assert_eq!(
            parse_directive("wctools-ignore-next-line invalidNumber, unknownAttribute"),
            Some(Directive::NextElement(RuleSet::Rules(HashSet::from([
                RuleId::InvalidNumber,
                RuleId::UnknownAttribute
            ]))))
        );
        assert_eq!(
            parse_directive("wctools-ignore unknownElement deprecatedElement"),
            Some(Directive::Document(RuleSet::Rules(HashSet::from([
                RuleId::UnknownElement,
                RuleId::DeprecatedElement
            ]))))
        );
        assert_eq!(parse_directive("a regular comment"), None);
        assert_eq!(parse_directive("wctools-ignored"), None);
    }

    #[test]
    fn test_unknown_rule_names_are_dropped() {
        let Some(Directive::Document(rules)) = parse_directive("wctools-ignore nope") else {
            panic!("expected a document directive");
        };
        assert!(!rules.contains(RuleId::UnknownElement));
    }

    #[test]
    fn test_next_line_applies_once() {
        let mut state = SuppressionState::default();
        state.comment("wctools-ignore-next-line unknownElement");

        let first = state.element();
        assert!(first.is_suppressed(RuleId::UnknownElement));
        assert!(!first.is_suppressed(RuleId::DeprecatedElement));
        assert!(!state.element().is_suppressed(RuleId::UnknownElement));
    }

    #[test]
    fn test_document_directives_merge() {
        let mut state = SuppressionState::with_document_directives([
            "wctools-ignore invalidNumber",
            "wctools-ignore unknownElement",
            "not a directive",
        ]);
        let suppressions = state.element();
        assert!(suppressions.is_suppressed(RuleId::InvalidNumber));
        assert!(suppressions.is_suppressed(RuleId::UnknownElement));
        assert!(!suppressions.is_suppressed(RuleId::InvalidBoolean));
    }
}
