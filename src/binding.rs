//! Binding-prefix resolution for attribute-like tokens.
//!
//! Templating syntaxes put a marker in front of an attribute name to bind something
//! other than a plain attribute:
//!
//! | Token | Prefix | Resolves to |
//! |-------|--------|-------------|
//! | `size` | none | attribute, else property |
//! | `:size`, `v-bind:size` | generic | attribute, else property |
//! | `.value` | property | property |
//! | `?disabled` | boolean | boolean attribute |
//! | `@change`, `(change)`, `v-on:change` | event | event |
//! | `[value]` | bracket | property |
//! | `[attr.size]` | bracket + force-attribute | attribute |
//!
//! Resolution is a pure function of the registry snapshot and the token.

use crate::registry::{AttributeMetadata, EventMetadata, PropertyMetadata, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingPrefix {
    None,
    Property,
    Boolean,
    Event,
    Generic,
    Bracket,
}

/// Which metadata collection a binding targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Attributes, falling back to properties
    AttributeOrProperty,
    Attribute,
    BooleanAttribute,
    Property,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding<'a> {
    pub prefix: BindingPrefix,
    /// The marker text as written, e.g. `.`, `v-bind:`, `[attr.`
    pub marker: &'a str,
    pub base_name: &'a str,
    /// `[attr.name]`
    pub force_attribute: bool,
    /// Closing character the syntax requires after the name, `]` or `)`
    pub closing: Option<char>,
}

impl Binding<'_> {
    pub fn category(&self) -> Category {
        match (self.prefix, self.force_attribute) {
            (BindingPrefix::None | BindingPrefix::Generic, _) => Category::AttributeOrProperty,
            (BindingPrefix::Bracket, true) => Category::Attribute,
            (BindingPrefix::Property | BindingPrefix::Bracket, _) => Category::Property,
            (BindingPrefix::Boolean, _) => Category::BooleanAttribute,
            (BindingPrefix::Event, _) => Category::Event,
        }
    }

    /// True for tokens whose value is an expression rather than literal text.
    pub fn is_bound(&self) -> bool {
        self.prefix != BindingPrefix::None
    }
}

fn binding<'a>(token: &'a str, prefix: BindingPrefix, marker_len: usize, base_name: &'a str) -> Binding<'a> {
    Binding {
        prefix,
        marker: &token[..marker_len],
        base_name,
        force_attribute: false,
        closing: None,
    }
}

/// Splits a raw token into its binding marker and base name.
pub fn parse_binding(raw_token: &str) -> Binding<'_> {
    let token = raw_token.trim();

    if let Some(rest) = token.strip_prefix("v-bind:") {
        return binding(token, BindingPrefix::Generic, "v-bind:".len(), rest);
    }
    if let Some(rest) = token.strip_prefix("v-on:") {
        return binding(token, BindingPrefix::Event, "v-on:".len(), rest);
    }

    match token.chars().next() {
        Some('.') => binding(token, BindingPrefix::Property, 1, &token[1..]),
        Some('?') => binding(token, BindingPrefix::Boolean, 1, &token[1..]),
        Some('@') => binding(token, BindingPrefix::Event, 1, &token[1..]),
        Some(':') => binding(token, BindingPrefix::Generic, 1, &token[1..]),
        Some('(') => Binding {
            closing: Some(')'),
            ..binding(token, BindingPrefix::Event, 1, token[1..].trim_end_matches(')'))
        },
        Some('[') => {
            // `[(ngModel)]` two-way bindings carry parens inside the brackets
            let inner = token[1..]
                .trim_end_matches(']')
                .trim_start_matches('(')
                .trim_end_matches(')');
            match inner.strip_prefix("attr.") {
                Some(base_name) => Binding {
                    force_attribute: true,
                    closing: Some(']'),
                    ..binding(token, BindingPrefix::Bracket, "[attr.".len(), base_name)
                },
                None => Binding {
                    closing: Some(']'),
                    ..binding(token, BindingPrefix::Bracket, 1, inner)
                },
            }
        }
        _ => binding(token, BindingPrefix::None, 0, token),
    }
}

/// The metadata a token refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'r> {
    Attribute(&'r AttributeMetadata),
    Property(&'r PropertyMetadata),
    Event(&'r EventMetadata),
}

impl<'r> Resolved<'r> {
    pub fn name(&self) -> &'r str {
        match self {
            Resolved::Attribute(attribute) => &attribute.name,
            Resolved::Property(property) => &property.name,
            Resolved::Event(event) => &event.name,
        }
    }
}

/// Resolves `raw_token` on `tag`. Unknown tags or names yield `None`.
pub fn resolve<'r>(registry: &'r Registry, tag: &str, raw_token: &str) -> Option<Resolved<'r>> {
    let binding = parse_binding(raw_token);
    resolve_binding(registry, tag, &binding)
}

pub fn resolve_binding<'r>(registry: &'r Registry, tag: &str, binding: &Binding) -> Option<Resolved<'r>> {
    let component = registry.component(tag)?;
    let name = binding.base_name;
    if name.is_empty() {
        return None;
    }

    match binding.category() {
        Category::AttributeOrProperty => component
            .attribute(name)
            .map(Resolved::Attribute)
            .or_else(|| component.property(name).map(Resolved::Property)),
        Category::Attribute => component.attribute(name).map(Resolved::Attribute),
        Category::BooleanAttribute => component
            .attribute(name)
            .filter(|attribute| attribute.value_kind.is_boolean())
            .map(Resolved::Attribute),
        Category::Property => component.property(name).map(Resolved::Property),
        Category::Event => component.event(name).map(Resolved::Event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::registry_from_declarations;

    fn registry() -> Registry {
        registry_from_declarations(
            r#"{
                "tagName": "x-input",
                "attributes": [
                    { "name": "disabled", "type": { "text": "boolean" } },
                    { "name": "size", "type": { "text": "'s' | 'l'" } }
                ],
                "members": [
                    { "kind": "field", "name": "value", "type": { "text": "string" } },
                    { "kind": "field", "name": "size", "type": { "text": "string" } }
                ],
                "events": [{ "name": "change" }]
            }"#,
        )
    }

    #[test]
    fn test_parse_prefixes() {
        let cases = [
            ("size", BindingPrefix::None, "size"),
            (".value", BindingPrefix::Property, "value"),
            ("?disabled", BindingPrefix::Boolean, "disabled"),
            ("@change", BindingPrefix::Event, "change"),
            ("(change)", BindingPrefix::Event, "change"),
            ("v-on:change", BindingPrefix::Event, "change"),
            (":size", BindingPrefix::Generic, "size"),
            ("v-bind:size", BindingPrefix::Generic, "size"),
            ("[value]", BindingPrefix::Bracket, "value"),
            ("[(value)]", BindingPrefix::Bracket, "value"),
        ];
        for (token, prefix, base) in cases {
            let binding = parse_binding(token);
            assert_eq!(binding.prefix, prefix, "prefix of {token}");
            assert_eq!(binding.base_name, base, "base name of {token}");
        }
    }

    #[test]
    fn test_force_attribute_marker() {
        let binding = parse_binding("[attr.size]");
        assert_eq!(binding.prefix, BindingPrefix::Bracket);
        assert!(binding.force_attribute);
        assert_eq!(binding.base_name, "size");
        assert_eq!(binding.category(), Category::Attribute);
        assert_eq!(parse_binding("[size]").category(), Category::Property);
    }

    #[test]
    fn test_resolve_categories() {
        let registry = registry();

        assert!(matches!(resolve(&registry, "x-input", "size"), Some(Resolved::Attribute(_))));
        assert!(matches!(resolve(&registry, "x-input", "value"), Some(Resolved::Property(_))));
        assert!(matches!(resolve(&registry, "x-input", ":value"), Some(Resolved::Property(_))));
        assert!(matches!(resolve(&registry, "x-input", ".size"), Some(Resolved::Property(_))));
        assert!(matches!(resolve(&registry, "x-input", "[size]"), Some(Resolved::Property(_))));
        assert!(matches!(
            resolve(&registry, "x-input", "[attr.size]"),
            Some(Resolved::Attribute(_))
        ));
        assert!(matches!(resolve(&registry, "x-input", "@change"), Some(Resolved::Event(_))));
    }

    #[test]
    fn test_boolean_bind_requires_boolean_kind() {
        let registry = registry();
        assert!(matches!(
            resolve(&registry, "x-input", "?disabled"),
            Some(Resolved::Attribute(_))
        ));
        assert_eq!(resolve(&registry, "x-input", "?size"), None);
    }

    #[test]
    fn test_unknown_is_none() {
        let registry = registry();
        assert_eq!(resolve(&registry, "x-input", "nope"), None);
        assert_eq!(resolve(&registry, "x-input", "@nope"), None);
        assert_eq!(resolve(&registry, "x-input", "."), None);
        assert_eq!(resolve(&registry, "x-missing", "size"), None);
        assert_eq!(resolve(&registry, "x-input", "[attr.value]"), None);
    }
}
