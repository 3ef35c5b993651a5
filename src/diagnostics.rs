//! Markup validation against the registry.
//!
//! Elements are visited in document order. Element-level rules run on every custom
//! element; attribute-level rules run over the raw opening tag of elements the registry
//! knows, so duplicates and binding markers are seen exactly as written.

mod rules;
pub mod scanner;
pub mod suppression;

pub use rules::RuleId;

use std::collections::HashSet;
use std::ops::Range;

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, DiagnosticTag, NumberOrString};

use crate::{
    binding::{parse_binding, resolve_binding, BindingPrefix, Category, Resolved},
    config::{Severity, Settings},
    document::Document,
    markup::{walk, MarkupElement, MarkupNode, MarkupParser},
    registry::{ComponentMetadata, Deprecation, Registry, ValueKind},
};

use self::{
    scanner::{scan_attributes, AttributeOccurrence},
    suppression::{SuppressionState, Suppressions},
};

pub const DIAGNOSTIC_SOURCE: &str = "wcls";

/// Attributes every HTML element accepts.
const GLOBAL_ATTRIBUTES: &[&str] = &[
    "accesskey",
    "autocapitalize",
    "autofocus",
    "class",
    "contenteditable",
    "dir",
    "draggable",
    "enterkeyhint",
    "exportparts",
    "hidden",
    "id",
    "inert",
    "inputmode",
    "is",
    "itemid",
    "itemprop",
    "itemref",
    "itemscope",
    "itemtype",
    "key",
    "lang",
    "nonce",
    "part",
    "popover",
    "ref",
    "role",
    "slot",
    "spellcheck",
    "style",
    "tabindex",
    "title",
    "translate",
    "writingsuggestions",
    "xmlns",
];

/// Global attributes, data/aria attributes, inline handlers and framework directives.
fn is_exempt_attribute(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    GLOBAL_ATTRIBUTES.contains(&name.as_str())
        || name.starts_with("data-")
        || name.starts_with("aria-")
        || name.starts_with("v-")
        || name.starts_with("let-")
        || name.starts_with(['#', '*'])
        || name.contains(':')
        || (name.starts_with("on") && name.len() > 2 && name.chars().all(|c| c.is_ascii_lowercase()))
}

fn lsp_severity(severity: Severity) -> Option<DiagnosticSeverity> {
    match severity {
        Severity::Error => Some(DiagnosticSeverity::ERROR),
        Severity::Warning => Some(DiagnosticSeverity::WARNING),
        Severity::Info => Some(DiagnosticSeverity::INFORMATION),
        Severity::Hint => Some(DiagnosticSeverity::HINT),
        Severity::Off => None,
    }
}

struct Emitter<'a> {
    settings: &'a Settings,
    document: &'a Document,
    diagnostics: Vec<Diagnostic>,
}

impl Emitter<'_> {
    fn emit(
        &mut self,
        rule: RuleId,
        package: Option<&str>,
        suppressions: &Suppressions,
        range: Range<usize>,
        message: String,
    ) {
        if suppressions.is_suppressed(rule) {
            return;
        }
        let Some(severity) = lsp_severity(self.settings.severity(rule, package)) else {
            return;
        };

        let tags = matches!(rule, RuleId::DeprecatedElement | RuleId::DeprecatedAttribute)
            .then(|| vec![DiagnosticTag::DEPRECATED]);

        self.diagnostics.push(Diagnostic {
            range: self.document.range(range),
            severity: Some(severity),
            code: Some(NumberOrString::String(rule.name().into())),
            source: Some(DIAGNOSTIC_SOURCE.into()),
            message,
            tags,
            ..Default::default()
        });
    }
}

/// Validates the parsed `nodes` of `document`.
///
/// Returns `None` when diagnostics are disabled in the settings.
pub fn diagnostics(
    registry: &Registry,
    settings: &Settings,
    document: &Document,
    nodes: &[MarkupNode],
) -> Option<Vec<Diagnostic>> {
    if !settings.diagnostics {
        return None;
    }

    let mut comments = vec![];
    walk(nodes, |node| {
        if let MarkupNode::Comment(comment) = node {
            comments.push(comment.text.as_str());
        }
    });
    let mut state = SuppressionState::with_document_directives(comments);

    let mut emitter = Emitter {
        settings,
        document,
        diagnostics: vec![],
    };

    walk(nodes, |node| match node {
        MarkupNode::Comment(comment) => state.comment(&comment.text),
        MarkupNode::Element(element) => {
            let suppressions = state.element();
            check_element(registry, &mut emitter, element, &suppressions);
        }
    });

    Some(emitter.diagnostics)
}

/// Parses and validates `text` in one step.
pub fn validate_text(
    registry: &Registry,
    settings: &Settings,
    text: &str,
    parser: &dyn MarkupParser,
) -> Vec<Diagnostic> {
    let document = Document::new(text);
    let nodes = parser.parse(text);
    diagnostics(registry, settings, &document, &nodes).unwrap_or_default()
}

fn check_element(
    registry: &Registry,
    emitter: &mut Emitter,
    element: &MarkupElement,
    suppressions: &Suppressions,
) {
    let tag = element.tag.to_ascii_lowercase();
    if !tag.contains('-') {
        return;
    }

    let Some(component) = registry.component(&tag) else {
        emitter.emit(
            RuleId::UnknownElement,
            None,
            suppressions,
            element.tag_range.clone(),
            format!("Unknown custom element '{tag}'"),
        );
        return;
    };

    let package = component.package.as_deref();

    if let Some(deprecation) = &component.deprecated {
        emitter.emit(
            RuleId::DeprecatedElement,
            package,
            suppressions,
            element.tag_range.clone(),
            deprecated_message(&format!("Element '{tag}'"), deprecation),
        );
    }

    let document = emitter.document;
    let occurrences = scan_attributes(document.text(), element.open_tag.clone());
    let mut seen = HashSet::new();
    for occurrence in &occurrences {
        if !seen.insert(occurrence.name) {
            emitter.emit(
                RuleId::DuplicateAttribute,
                package,
                suppressions,
                occurrence.name_range.clone(),
                format!("Duplicate attribute '{}'", occurrence.name),
            );
            continue;
        }

        check_attribute(registry, emitter, component, occurrence, suppressions);
    }
}

fn check_attribute(
    registry: &Registry,
    emitter: &mut Emitter,
    component: &ComponentMetadata,
    occurrence: &AttributeOccurrence,
    suppressions: &Suppressions,
) {
    let package = component.package.as_deref();
    let tag = &component.tag;
    let binding = parse_binding(occurrence.name);
    let name = binding.base_name;
    if name.is_empty() {
        return;
    }

    let names_an_attribute = matches!(binding.prefix, BindingPrefix::None)
        || matches!(binding.category(), Category::Attribute | Category::BooleanAttribute);
    if names_an_attribute && component.attribute(name).is_none() && !is_exempt_attribute(name) {
        emitter.emit(
            RuleId::UnknownAttribute,
            package,
            suppressions,
            occurrence.name_range.clone(),
            format!("Unknown attribute '{name}' on '{tag}'"),
        );
        return;
    }

    let Some(resolved) = resolve_binding(registry, tag, &binding) else {
        return;
    };

    let deprecated = match resolved {
        Resolved::Attribute(attribute) => attribute.deprecated.as_ref(),
        Resolved::Property(property) => property.deprecated.as_ref(),
        Resolved::Event(event) => event.deprecated.as_ref(),
    };
    if let Some(deprecation) = deprecated {
        emitter.emit(
            RuleId::DeprecatedAttribute,
            package,
            suppressions,
            occurrence.name_range.clone(),
            deprecated_message(&format!("Attribute '{name}'"), deprecation),
        );
    }

    let (Resolved::Attribute(attribute), Some(value)) = (resolved, &occurrence.value) else {
        return;
    };

    // bound values are expressions; only string literals in them are checked
    let literal = match binding.prefix {
        BindingPrefix::None if value.is_interpolated() => None,
        BindingPrefix::None => Some(value.text),
        BindingPrefix::Event => None,
        _ => value.string_literal(),
    };

    match &attribute.value_kind {
        ValueKind::Boolean if binding.prefix == BindingPrefix::None && !value.is_interpolated() => {
            emitter.emit(
                RuleId::InvalidBoolean,
                package,
                suppressions,
                value.range.clone(),
                format!("Boolean attribute '{name}' does not take a value; its presence means true"),
            );
        }
        ValueKind::Number => {
            if let Some(literal) = literal.filter(|literal| !literal.trim().parse::<f64>().is_ok_and(f64::is_finite)) {
                emitter.emit(
                    RuleId::InvalidNumber,
                    package,
                    suppressions,
                    value.range.clone(),
                    format!("'{literal}' is not a valid number for '{name}'"),
                );
            }
        }
        ValueKind::Enum(options) => {
            if let Some(literal) = literal.filter(|literal| !options.iter().any(|option| option.as_str() == *literal)) {
                emitter.emit(
                    RuleId::InvalidAttributeValue,
                    package,
                    suppressions,
                    value.range.clone(),
                    format!(
                        "'{literal}' is not a valid value for '{name}'. Expected one of: {}",
                        options.iter().map(|option| format!("'{option}'")).collect::<Vec<_>>().join(", ")
                    ),
                );
            }
        }
        ValueKind::Boolean | ValueKind::String => {}
    }
}

fn deprecated_message(subject: &str, deprecation: &Deprecation) -> String {
    match deprecation.message() {
        Some(message) => format!("{subject} is deprecated: {message}"),
        None => format!("{subject} is deprecated"),
    }
}
