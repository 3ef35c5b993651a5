//! Markup parsing capability.
//!
//! Diagnostics consume a tree of elements and comments. Hosts with a real HTML or template
//! parser implement [`MarkupParser`]; [`TagScanner`] is a best-effort scanner that works on
//! plain HTML and on templates embedded in script files.

use std::ops::Range;

/// A node of parsed markup. All ranges are byte offsets into the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(MarkupElement),
    Comment(MarkupComment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    pub tag: String,
    /// Span of the tag name inside the opening tag
    pub tag_range: Range<usize>,
    /// Span of the whole opening tag, `<` through `>`
    pub open_tag: Range<usize>,
    pub children: Vec<MarkupNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupComment {
    /// Text between `<!--` and `-->`
    pub text: String,
    pub range: Range<usize>,
}

pub trait MarkupParser: Send + Sync {
    fn parse(&self, text: &str) -> Vec<MarkupNode>;
}

impl MarkupNode {
    /// Visits this node and its descendants in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a MarkupNode)) {
        visit(self);
        if let MarkupNode::Element(element) = self {
            for child in &element.children {
                child.walk(visit);
            }
        }
    }
}

/// Visits every node of `nodes` in document order.
pub fn walk<'a>(nodes: &'a [MarkupNode], mut visit: impl FnMut(&'a MarkupNode)) {
    for node in nodes {
        node.walk(&mut visit);
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Contents of these elements are not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "textarea", "title"];

/// Tolerant tag scanner.
///
/// Unclosed elements are closed at the end of the document, stray closing tags are
/// ignored, and an opening tag with no terminating `>` is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagScanner;

impl MarkupParser for TagScanner {
    fn parse(&self, text: &str) -> Vec<MarkupNode> {
        let mut stack: Vec<(MarkupElement, Vec<MarkupNode>)> = vec![];
        let mut roots = vec![];
        let mut pos = 0;

        fn push(node: MarkupNode, stack: &mut [(MarkupElement, Vec<MarkupNode>)], roots: &mut Vec<MarkupNode>) {
            match stack.last_mut() {
                Some((_, children)) => children.push(node),
                None => roots.push(node),
            }
        }

        fn close(stack: &mut Vec<(MarkupElement, Vec<MarkupNode>)>, roots: &mut Vec<MarkupNode>) {
            if let Some((mut element, children)) = stack.pop() {
                element.children = children;
                push(MarkupNode::Element(element), stack, roots);
            }
        }

        while let Some(offset) = text[pos..].find('<') {
            let start = pos + offset;
            let rest = &text[start..];

            if let Some(body) = rest.strip_prefix("<!--") {
                let (comment, end) = match body.find("-->") {
                    Some(len) => (&body[..len], start + 4 + len + 3),
                    None => (body, text.len()),
                };
                push(
                    MarkupNode::Comment(MarkupComment {
                        text: comment.to_string(),
                        range: start..end,
                    }),
                    &mut stack,
                    &mut roots,
                );
                pos = end;
                continue;
            }

            if let Some(name) = rest.strip_prefix("</") {
                let name_len = tag_name_len(name);
                let name = &name[..name_len];
                if let Some(depth) = stack.iter().rposition(|(element, _)| element.tag.eq_ignore_ascii_case(name)) {
                    while stack.len() > depth {
                        close(&mut stack, &mut roots);
                    }
                }
                pos = start + 2 + name_len;
                continue;
            }

            let name_len = tag_name_len(&rest[1..]);
            if name_len == 0 {
                pos = start + 1;
                continue;
            }
            let tag_range = start + 1..start + 1 + name_len;

            let Some(end) = open_tag_end(text, tag_range.end) else {
                tracing::debug!(offset = start, "unterminated opening tag, skipping");
                pos = tag_range.end;
                continue;
            };

            let tag = text[tag_range.clone()].to_string();
            let self_closing = text[..end - 1].ends_with('/');
            let element = MarkupElement {
                tag,
                tag_range,
                open_tag: start..end,
                children: vec![],
            };
            pos = end;

            let lower = element.tag.to_ascii_lowercase();
            if self_closing || VOID_ELEMENTS.contains(&lower.as_str()) {
                push(MarkupNode::Element(element), &mut stack, &mut roots);
            } else if RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
                let closing = format!("</{lower}");
                pos = text[pos..]
                    .to_ascii_lowercase()
                    .find(&closing)
                    .map_or(text.len(), |offset| pos + offset);
                stack.push((element, vec![]));
            } else {
                stack.push((element, vec![]));
            }
        }

        while !stack.is_empty() {
            close(&mut stack, &mut roots);
        }
        roots
    }
}

fn tag_name_len(text: &str) -> usize {
    if !text.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return 0;
    }
    text.find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
        .unwrap_or(text.len())
}

/// Offset just past the `>` closing an opening tag, honouring quotes and `{…}` interpolations.
fn open_tag_end(text: &str, from: usize) -> Option<usize> {
    let mut quote = None;
    let mut depth = 0usize;
    for (i, c) in text[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if depth == 0 => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => return Some(from + i + 1),
            (None, '<') if depth == 0 => return None,
            _ => {}
        }
    }
    None
}
