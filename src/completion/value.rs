use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};

use crate::{
    binding::{parse_binding, resolve_binding, Resolved},
    registry::{Registry, ValueKind},
};

use super::{
    util::{open_tag_before, text_before_cursor},
    Completer, Context,
};

/// Completes an attribute value after `name="`.
pub struct ValueCompleter<'a> {
    registry: &'a Registry,
    tag: String,
    attribute: &'a str,
    value: Range<usize>,
}

impl<'a> Completer<'a> for ValueCompleter<'a> {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self> {
        static VALUE_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r#"\s(?<name>[^\s=<>"']+)\s*=\s*["']?(?<value>[^\s"'<>=]*)$"#).unwrap()
        });

        let text_before = text_before_cursor(&context, line, character)?;
        let open = open_tag_before(text_before)?;
        let captures = VALUE_RE.captures(open.text)?;
        let name = captures.name("name")?.as_str();
        let value = captures.name("value")?;

        let registry = context.snapshot.registry();
        let tag = open.tag.to_ascii_lowercase();
        let binding = parse_binding(name);
        if binding.is_bound() && !binding.force_attribute {
            return None;
        }
        let Some(Resolved::Attribute(attribute)) = resolve_binding(registry, &tag, &binding) else {
            return None;
        };

        Some(ValueCompleter {
            registry,
            tag,
            attribute: &attribute.name,
            value: open.start + value.start()..text_before.len(),
        })
    }

    fn completions(&self) -> Vec<CompletionItem> {
        attribute_value_completions(self.registry, &self.tag, self.attribute)
    }

    fn replace_range(&self) -> Range<usize> {
        self.value.clone()
    }
}

/// Value suggestions for `attribute` on `tag`. Only enumerated attributes have any.
pub fn attribute_value_completions(registry: &Registry, tag: &str, attribute: &str) -> Vec<CompletionItem> {
    let Some(metadata) = registry.attribute(tag, attribute) else {
        return vec![];
    };

    match &metadata.value_kind {
        ValueKind::Enum(options) => {
            let default = metadata
                .default
                .as_deref()
                .map(|default| default.trim().trim_matches(|c: char| c == '\'' || c == '"'));

            options
                .iter()
                .enumerate()
                .map(|(i, option)| CompletionItem {
                    label: option.clone(),
                    kind: Some(CompletionItemKind::ENUM_MEMBER),
                    detail: Some(if default == Some(option.as_str()) {
                        format!("{attribute} (default)")
                    } else {
                        attribute.to_string()
                    }),
                    sort_text: Some(format!("{i:04}")),
                    ..Default::default()
                })
                .collect()
        }
        ValueKind::Boolean | ValueKind::Number | ValueKind::String => vec![],
    }
}
