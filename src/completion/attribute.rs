//! Attribute, property and event completions inside an opening tag.
//!
//! The typed token's binding marker decides what is offered:
//!
//! | Typed | Offered | Inserted |
//! |-------|---------|----------|
//! | `var` | attributes | `variant="${1\|a,b\|}"`, `disabled`, `label="$1"` |
//! | `?dis` | boolean attributes | `?disabled` |
//! | `.val` | properties | `.value` |
//! | `[val` | properties | `[value]` |
//! | `[attr.` | attributes | `[attr.size]` |
//! | `@`, `v-on:` | events | `@change` |
//! | `(` | events | `(change)` |
//! | `:`, `v-bind:` | attributes and properties | `:size` |

use std::{collections::HashSet, ops::Range};

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionItemTag, Documentation, InsertTextFormat,
    MarkupContent, MarkupKind,
};

use crate::{
    binding::{parse_binding, Binding, BindingPrefix, Category},
    diagnostics::scanner::scan_attributes,
    project::ProjectSnapshot,
    registry::{ComponentMetadata, Deprecation, ValueKind},
};

use super::{
    util::{open_tag_before, text_before_cursor},
    Completer, Context,
};

/// Completes the attribute-position token under the cursor inside a known opening tag.
pub struct AttributeCompleter<'a> {
    snapshot: &'a ProjectSnapshot,
    tag: String,
    token: &'a str,
    tag_text: &'a str,
    token_range: Range<usize>,
}

impl<'a> Completer<'a> for AttributeCompleter<'a> {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self> {
        let text_before = text_before_cursor(&context, line, character)?;
        let open = open_tag_before(text_before)?;
        if open.quote.is_some() {
            return None;
        }

        let token_start = open
            .text
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())?;
        let token = &open.text[token_start..];
        if token.contains('=') {
            return None;
        }

        let tag = open.tag.to_ascii_lowercase();
        if !context.snapshot.registry().contains(&tag) {
            return None;
        }

        Some(AttributeCompleter {
            snapshot: context.snapshot,
            tag,
            token,
            tag_text: open.text,
            token_range: open.start + token_start..text_before.len(),
        })
    }

    fn completions(&self) -> Vec<CompletionItem> {
        attribute_completions(self.snapshot, &self.tag, self.token, self.tag_text)
    }

    fn replace_range(&self) -> Range<usize> {
        self.token_range.clone()
    }
}

/// Metadata common to everything an attribute-position token can name.
struct Entry<'a> {
    name: &'a str,
    kind: CompletionItemKind,
    value_kind: Option<&'a ValueKind>,
    detail: Option<String>,
    description: Option<&'a str>,
    deprecated: Option<&'a Deprecation>,
}

fn attribute_entries(component: &ComponentMetadata) -> impl Iterator<Item = Entry<'_>> {
    component.attributes.iter().map(|attribute| Entry {
        name: &attribute.name,
        kind: CompletionItemKind::FIELD,
        value_kind: Some(&attribute.value_kind),
        detail: Some(
            attribute
                .type_text
                .clone()
                .unwrap_or_else(|| attribute.value_kind.describe()),
        ),
        description: attribute.description.as_deref(),
        deprecated: attribute.deprecated.as_ref(),
    })
}

fn property_entries(component: &ComponentMetadata) -> impl Iterator<Item = Entry<'_>> {
    component.properties.iter().map(|property| Entry {
        name: &property.name,
        kind: CompletionItemKind::PROPERTY,
        value_kind: Some(&property.value_kind),
        detail: Some(
            property
                .type_text
                .clone()
                .unwrap_or_else(|| property.value_kind.describe()),
        ),
        description: property.description.as_deref(),
        deprecated: property.deprecated.as_ref(),
    })
}

fn event_entries(component: &ComponentMetadata) -> impl Iterator<Item = Entry<'_>> {
    component.events.iter().map(|event| Entry {
        name: &event.name,
        kind: CompletionItemKind::EVENT,
        value_kind: None,
        detail: event.type_text.clone(),
        description: event.description.as_deref(),
        deprecated: event.deprecated.as_ref(),
    })
}

/// Escapes a choice for use inside `${1|…|}`.
fn escape_choice(option: &str) -> String {
    option
        .replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace('|', "\\|")
        .replace('$', "\\$")
}

#[allow(deprecated)]
fn render(entry: Entry, binding: &Binding) -> CompletionItem {
    let name = entry.name;
    let label = format!("{}{name}{}", binding.marker, binding.closing.map(String::from).unwrap_or_default());

    let insert_text = match (binding.prefix, entry.value_kind) {
        (BindingPrefix::None, Some(ValueKind::Boolean)) => name.to_string(),
        (BindingPrefix::None, Some(ValueKind::Enum(options))) => format!(
            "{name}=\"${{1|{}|}}\"",
            options.iter().map(|option| escape_choice(option)).collect::<Vec<_>>().join(",")
        ),
        (BindingPrefix::None, _) => format!("{name}=\"$1\""),
        _ => label.clone(),
    };

    let deprecated = entry.deprecated.is_some();
    let documentation = match (entry.description, entry.deprecated.and_then(Deprecation::message)) {
        (Some(description), Some(message)) => Some(format!("{description}\n\n**Deprecated:** {message}")),
        (Some(description), None) => Some(description.to_string()),
        (None, Some(message)) => Some(format!("**Deprecated:** {message}")),
        (None, None) => None,
    };

    CompletionItem {
        label: label.clone(),
        kind: Some(entry.kind),
        detail: entry.detail,
        documentation: documentation.map(|value| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            })
        }),
        insert_text: Some(insert_text),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        filter_text: Some(label),
        sort_text: Some(format!("{}-{name}", if deprecated { 1 } else { 0 })),
        deprecated: Some(deprecated),
        tags: deprecated.then(|| vec![CompletionItemTag::DEPRECATED]),
        ..Default::default()
    }
}

/// Items for plain (unprefixed) attribute tokens; this is what the per-tag cache stores.
pub(crate) fn plain_attribute_items(component: &ComponentMetadata) -> Vec<CompletionItem> {
    let binding = parse_binding("");
    attribute_entries(component)
        .map(|entry| render(entry, &binding))
        .collect()
}

/// Completions for the attribute-position token `prefix` on `tag`.
///
/// `context_text` is the opening tag typed so far; names already present in it are not
/// offered again.
pub fn attribute_completions(
    snapshot: &ProjectSnapshot,
    tag: &str,
    prefix: &str,
    context_text: &str,
) -> Vec<CompletionItem> {
    let registry = snapshot.registry();
    let Some(component) = registry.component(tag) else {
        return vec![];
    };

    let binding = parse_binding(prefix);
    let present: HashSet<&str> = scan_attributes(context_text, 0..context_text.len())
        .into_iter()
        .map(|occurrence| parse_binding(occurrence.name).base_name)
        .filter(|name| *name != binding.base_name)
        .collect();

    let items: Vec<CompletionItem> = match (binding.prefix, binding.category()) {
        (BindingPrefix::None, _) => snapshot
            .completion_cache()
            .attribute_items(registry, tag)
            .map(<[CompletionItem]>::to_vec)
            .unwrap_or_default(),
        (_, Category::AttributeOrProperty) => {
            let attributes = attribute_entries(component);
            let properties = property_entries(component)
                .filter(|property| component.attribute(property.name).is_none());
            attributes.chain(properties).map(|entry| render(entry, &binding)).collect()
        }
        (_, Category::Attribute) => attribute_entries(component).map(|entry| render(entry, &binding)).collect(),
        (_, Category::BooleanAttribute) => attribute_entries(component)
            .filter(|entry| matches!(entry.value_kind, Some(ValueKind::Boolean)))
            .map(|entry| render(entry, &binding))
            .collect(),
        (_, Category::Property) => property_entries(component).map(|entry| render(entry, &binding)).collect(),
        (_, Category::Event) => event_entries(component).map(|entry| render(entry, &binding)).collect(),
    };

    items
        .into_iter()
        .filter(|item| {
            let name = parse_binding(&item.label).base_name;
            !present.contains(name)
        })
        .collect()
}
