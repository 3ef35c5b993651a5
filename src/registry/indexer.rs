//! Normalization of raw manifest declarations into typed component metadata.

use crate::{
    config::Settings,
    error::IndexError,
    locator::FieldIndex,
    manifest::schema::{type_text, RawAttribute, RawCssHook, RawDeclaration, RawEvent, RawMember},
};

use super::{
    types::{
        AttributeMetadata, ComponentMetadata, CssHook, CssHookKind, Deprecation, EventMetadata,
        NamedList, PropertyMetadata, ValueKind,
    },
    value_kind,
};

/// Per-source inputs shared by every declaration of one manifest.
pub struct IndexContext<'a> {
    pub settings: &'a Settings,
    /// Index of the manifest in the registry's source list
    pub source: usize,
    pub package: Option<&'a str>,
    pub fields: &'a FieldIndex,
}

impl IndexContext<'_> {
    fn kind_of(&self, fields: &serde_json::Map<String, serde_json::Value>) -> (ValueKind, Option<String>) {
        let text = self
            .settings
            .type_fields(self.package)
            .into_iter()
            .find_map(|field| type_text(fields, field));
        (value_kind::infer(text), text.map(str::to_string))
    }
}

/// A valid custom element name: starts with a lowercase ASCII letter, contains a hyphen,
/// and has no whitespace or uppercase characters.
pub fn is_custom_element_name(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_lowercase())
        && tag.contains('-')
        && !tag
            .chars()
            .any(|c| c.is_whitespace() || c.is_ascii_uppercase() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '='))
}

/// Applies the configured tag rename for `package`.
pub fn apply_tag_transform(tag: &str, package: Option<&str>, settings: &Settings) -> String {
    settings.transform_tag(tag, package)
}

/// Builds the typed metadata for one declaration.
pub fn normalize(raw: &RawDeclaration, cx: &IndexContext) -> Result<ComponentMetadata, IndexError> {
    let original_tag = raw.tag_name.as_deref().map(str::trim).unwrap_or_default();
    let malformed = |reason: &str| IndexError::MalformedComponent {
        name: raw
            .tag_name
            .clone()
            .or_else(|| raw.name.clone())
            .unwrap_or_else(|| "<unnamed>".to_string()),
        reason: reason.to_string(),
    };

    if !is_custom_element_name(original_tag) {
        return Err(malformed("tag name is not a valid custom element name"));
    }

    let tag = apply_tag_transform(original_tag, cx.package, cx.settings);
    if !is_custom_element_name(&tag) {
        return Err(malformed("transformed tag name is not a valid custom element name"));
    }

    let mut attributes = NamedList::default();
    for attribute in &raw.attributes {
        attributes.insert(&attribute.name, normalize_attribute(attribute, cx));
    }

    let mut properties = NamedList::default();
    for member in raw.members.iter().filter(|member| is_public_field(member)) {
        properties.insert(&member.name, normalize_property(member, cx));
    }

    let mut events = NamedList::default();
    for event in raw.events.iter().filter(|event| !event.name.trim().is_empty()) {
        events.insert(&event.name, normalize_event(event, cx));
    }

    Ok(ComponentMetadata {
        class_name: raw.name.clone(),
        description: raw.description.clone(),
        summary: raw.summary.clone(),
        deprecated: Deprecation::from_raw(raw.deprecated.as_ref()),
        source: cx.source,
        package: cx.package.map(str::to_string),
        attributes,
        properties,
        events,
        css_properties: css_hooks(&raw.css_properties, CssHookKind::Property, &tag),
        css_parts: css_hooks(&raw.css_parts, CssHookKind::Part, &tag),
        css_states: css_hooks(&raw.css_states, CssHookKind::State, &tag),
        offset: cx.fields.lookup("tagName", original_tag),
        tag,
    })
}

fn normalize_attribute(raw: &RawAttribute, cx: &IndexContext) -> AttributeMetadata {
    let (value_kind, type_text) = cx.kind_of(&raw.fields);
    AttributeMetadata {
        name: raw.name.clone(),
        description: raw.description.clone(),
        deprecated: Deprecation::from_raw(raw.deprecated.as_ref()),
        default: raw.default.clone(),
        field_name: raw.field_name.clone(),
        value_kind,
        type_text,
        offset: cx.fields.lookup("name", &raw.name),
    }
}

/// Properties come from instance fields that are not private or protected.
fn is_public_field(member: &RawMember) -> bool {
    member.kind.as_deref() == Some("field")
        && !member.is_static.unwrap_or(false)
        && !matches!(member.privacy.as_deref(), Some("private" | "protected"))
        && !member.name.starts_with('#')
}

fn normalize_property(raw: &RawMember, cx: &IndexContext) -> PropertyMetadata {
    let (value_kind, type_text) = cx.kind_of(&raw.fields);
    PropertyMetadata {
        name: raw.name.clone(),
        attribute: raw.attribute.clone(),
        description: raw.description.clone(),
        deprecated: Deprecation::from_raw(raw.deprecated.as_ref()),
        readonly: raw.readonly.unwrap_or(false),
        value_kind,
        type_text,
        offset: cx.fields.lookup("name", &raw.name),
    }
}

fn normalize_event(raw: &RawEvent, cx: &IndexContext) -> EventMetadata {
    let type_text = cx
        .settings
        .type_fields(cx.package)
        .into_iter()
        .find_map(|field| type_text(&raw.fields, field))
        .map(str::to_string);
    EventMetadata {
        name: raw.name.clone(),
        description: raw.description.clone(),
        deprecated: Deprecation::from_raw(raw.deprecated.as_ref()),
        type_text,
        offset: cx.fields.lookup("name", &raw.name),
    }
}

fn css_hooks(raw: &[RawCssHook], kind: CssHookKind, tag: &str) -> NamedList<CssHook> {
    let mut hooks = NamedList::default();
    for hook in raw.iter().filter(|hook| !hook.name.trim().is_empty()) {
        hooks.insert(
            &hook.name,
            CssHook {
                kind,
                name: hook.name.clone(),
                description: hook.description.clone(),
                syntax: hook.syntax.clone(),
                default: hook.default.clone(),
                tag: tag.to_string(),
            },
        );
    }
    hooks
}
