use tower_lsp::lsp_types::Position;

use super::Context;

/// An opening tag the cursor is still inside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTag<'a> {
    pub tag: &'a str,
    /// Byte offset of the `<`
    pub start: usize,
    /// Tag text from `<` up to the cursor
    pub text: &'a str,
    /// Set when the cursor sits inside a quoted value
    pub quote: Option<char>,
}

/// Finds the opening tag enclosing the end of `text_before`, if it is not yet closed.
pub fn open_tag_before(text_before: &str) -> Option<OpenTag<'_>> {
    let start = text_before.rfind('<')?;
    let text = &text_before[start..];

    let name_len = text[1..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
        .unwrap_or(text.len() - 1);
    if name_len == 0 || !text[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut quote = None;
    let mut depth = 0usize;
    for c in text[1 + name_len..].chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if depth == 0 => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => return None,
            _ => {}
        }
    }

    Some(OpenTag {
        tag: &text[1..1 + name_len],
        start,
        text,
        quote,
    })
}

/// Document text up to the cursor; its length is the cursor's byte offset.
pub fn text_before_cursor<'a>(context: &Context<'a>, line: usize, character: usize) -> Option<&'a str> {
    context.document.text_before(Position {
        line: line as u32,
        character: character as u32,
    })
}
