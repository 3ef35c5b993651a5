use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionItemTag, Documentation, InsertTextFormat,
    MarkupContent, MarkupKind,
};

use crate::registry::{ComponentMetadata, Registry};

use super::{util::text_before_cursor, Completer, Context};

/// Sort prefix for custom tags. `"0-"` sorts ahead of the `"1-"` an HTML-aware host gives
/// built-in tags.
pub const CUSTOM_TAG_SORT_PREFIX: &str = "0-";

/// Completes a tag name right after `<`.
pub struct TagCompleter<'a> {
    registry: &'a Registry,
    partial: Range<usize>,
}

impl<'a> Completer<'a> for TagCompleter<'a> {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self> {
        static TAG_START_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"<(?<partial>[a-zA-Z][a-zA-Z0-9_-]*)?$").unwrap());

        let text_before = text_before_cursor(&context, line, character)?;
        let captures = TAG_START_RE.captures(text_before)?;
        let start = captures.get(0)?.start() + 1;

        Some(TagCompleter {
            registry: context.snapshot.registry(),
            partial: start..text_before.len(),
        })
    }

    fn completions(&self) -> Vec<CompletionItem> {
        tag_completions(self.registry, false)
    }

    fn replace_range(&self) -> Range<usize> {
        self.partial.clone()
    }
}

pub fn tag_completions(registry: &Registry, include_open_bracket: bool) -> Vec<CompletionItem> {
    registry
        .components()
        .map(|component| tag_item(component, include_open_bracket))
        .collect()
}

#[allow(deprecated)]
fn tag_item(component: &ComponentMetadata, include_open_bracket: bool) -> CompletionItem {
    let tag = &component.tag;
    let open = if include_open_bracket { "<" } else { "" };
    let deprecated = component.deprecated.is_some();

    CompletionItem {
        label: tag.clone(),
        kind: Some(CompletionItemKind::CLASS),
        detail: component.class_name.clone(),
        documentation: component.short_description().map(|text| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: text.to_string(),
            })
        }),
        insert_text: Some(format!("{open}{tag}>$0</{tag}>")),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        filter_text: Some(format!("{open}{tag}")),
        sort_text: Some(format!("{CUSTOM_TAG_SORT_PREFIX}{tag}")),
        deprecated: Some(deprecated),
        tags: deprecated.then(|| vec![CompletionItemTag::DEPRECATED]),
        ..Default::default()
    }
}
