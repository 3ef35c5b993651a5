use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Documentation, MarkupContent, MarkupKind};

use crate::registry::{CssHook, CssHookKind, Registry};

use super::{util::text_before_cursor, Completer, Context};

/// Completes `var(--`, `::part(` and `:state(` references.
pub struct CssCompleter<'a> {
    registry: &'a Registry,
    kind: CssHookKind,
    reference: Range<usize>,
}

impl<'a> Completer<'a> for CssCompleter<'a> {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self> {
        static CSS_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?<var>var\(\s*(?:--[\w-]*)?)$|(?<part>::part\([\w-]*)$|(?<state>:state\([\w-]*)$").unwrap()
        });

        let text_before = text_before_cursor(&context, line, character)?;
        let captures = CSS_REFERENCE_RE.captures(text_before)?;
        let (kind, reference) = [
            (CssHookKind::Property, "var"),
            (CssHookKind::Part, "part"),
            (CssHookKind::State, "state"),
        ]
        .into_iter()
        .find_map(|(kind, group)| Some((kind, captures.name(group)?)))?;

        // take over a closing paren the editor already inserted
        let mut end = text_before.len();
        if context.document.text()[end..].starts_with(')') {
            end += 1;
        }

        Some(CssCompleter {
            registry: context.snapshot.registry(),
            kind,
            reference: reference.start()..end,
        })
    }

    fn completions(&self) -> Vec<CompletionItem> {
        css_completions(self.registry, self.kind)
    }

    fn replace_range(&self) -> Range<usize> {
        self.reference.clone()
    }
}

/// Workspace-wide completions for one kind of styling hook.
pub fn css_completions(registry: &Registry, kind: CssHookKind) -> Vec<CompletionItem> {
    registry.css_pool(kind).iter().map(css_item).collect()
}

fn css_item(hook: &CssHook) -> CompletionItem {
    let mut documentation = hook.description.clone().unwrap_or_default();
    if let Some(syntax) = &hook.syntax {
        documentation.push_str(&format!("\n\nSyntax: `{syntax}`"));
    }
    if let Some(default) = &hook.default {
        documentation.push_str(&format!("\n\nDefault: `{default}`"));
    }

    CompletionItem {
        label: hook.kind.reference(&hook.name),
        kind: Some(match hook.kind {
            CssHookKind::Property => CompletionItemKind::VARIABLE,
            CssHookKind::Part | CssHookKind::State => CompletionItemKind::PROPERTY,
        }),
        detail: Some(format!("<{}>", hook.tag)),
        documentation: (!documentation.trim().is_empty()).then(|| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: documentation.trim().to_string(),
            })
        }),
        ..Default::default()
    }
}
