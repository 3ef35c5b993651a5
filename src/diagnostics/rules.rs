use std::{fmt, str::FromStr};

use anyhow::anyhow;

use crate::config::Severity;

/// Diagnostic rule identifiers. The wire name is used in configuration, suppression
/// directives and the `code` of emitted diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    UnknownElement,
    DeprecatedElement,
    DuplicateAttribute,
    UnknownAttribute,
    DeprecatedAttribute,
    InvalidBoolean,
    InvalidNumber,
    InvalidAttributeValue,
}

impl RuleId {
    pub const ALL: [RuleId; 8] = [
        RuleId::UnknownElement,
        RuleId::DeprecatedElement,
        RuleId::DuplicateAttribute,
        RuleId::UnknownAttribute,
        RuleId::DeprecatedAttribute,
        RuleId::InvalidBoolean,
        RuleId::InvalidNumber,
        RuleId::InvalidAttributeValue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RuleId::UnknownElement => "unknownElement",
            RuleId::DeprecatedElement => "deprecatedElement",
            RuleId::DuplicateAttribute => "duplicateAttribute",
            RuleId::UnknownAttribute => "unknownAttribute",
            RuleId::DeprecatedAttribute => "deprecatedAttribute",
            RuleId::InvalidBoolean => "invalidBoolean",
            RuleId::InvalidNumber => "invalidNumber",
            RuleId::InvalidAttributeValue => "invalidAttributeValue",
        }
    }

    /// Severity used when neither the package nor the project configures the rule.
    pub fn default_severity(&self) -> Severity {
        match self {
            RuleId::UnknownElement | RuleId::UnknownAttribute => Severity::Hint,
            RuleId::DeprecatedElement | RuleId::DeprecatedAttribute => Severity::Warning,
            RuleId::DuplicateAttribute
            | RuleId::InvalidBoolean
            | RuleId::InvalidNumber
            | RuleId::InvalidAttributeValue => Severity::Error,
        }
    }
}

impl FromStr for RuleId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RuleId::ALL
            .into_iter()
            .find(|rule| rule.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("unknown rule '{s}'"))
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
