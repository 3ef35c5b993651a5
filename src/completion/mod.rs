use std::ops::Range;

use tower_lsp::lsp_types::{
    CompletionItem, CompletionList, CompletionResponse, CompletionTextEdit, Position, TextEdit,
};

use crate::{document::Document, project::ProjectSnapshot};

use self::{
    attribute::AttributeCompleter, css::CssCompleter, tag::TagCompleter, value::ValueCompleter,
};

pub use self::{
    attribute::attribute_completions,
    cache::CompletionCache,
    css::css_completions,
    tag::{tag_completions, CUSTOM_TAG_SORT_PREFIX},
    value::attribute_value_completions,
};

mod attribute;
mod cache;
mod css;
mod tag;
mod util;
mod value;

#[derive(Clone, Copy)]
pub struct Context<'a> {
    snapshot: &'a ProjectSnapshot,
    document: &'a Document,
}

pub trait Completer<'a>: Sized {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self>;

    fn completions(&self) -> Vec<CompletionItem>;

    /// Byte range of the document an accepted item replaces.
    fn replace_range(&self) -> Range<usize>;
}

pub fn get_completions(
    snapshot: &ProjectSnapshot,
    document: &Document,
    position: Position,
) -> Option<CompletionResponse> {
    let completion_context = Context { snapshot, document };

    run_completer::<ValueCompleter>(completion_context, position.line, position.character)
        .or_else(|| {
            run_completer::<AttributeCompleter>(completion_context, position.line, position.character)
        })
        .or_else(|| run_completer::<TagCompleter>(completion_context, position.line, position.character))
        .or_else(|| run_completer::<CssCompleter>(completion_context, position.line, position.character))
}

fn run_completer<'a, T: Completer<'a>>(
    context: Context<'a>,
    line: u32,
    character: u32,
) -> Option<CompletionResponse> {
    let completer = T::construct(context, line as usize, character as usize)?;
    let range = context.document.range(completer.replace_range());

    let items = completer
        .completions()
        .into_iter()
        .map(|mut item| {
            let new_text = item.insert_text.take().unwrap_or_else(|| item.label.clone());
            item.text_edit = Some(CompletionTextEdit::Edit(TextEdit { range, new_text }));
            item
        })
        .collect::<Vec<CompletionItem>>();

    Some(CompletionResponse::List(CompletionList {
        is_incomplete: false,
        items,
    }))
}
