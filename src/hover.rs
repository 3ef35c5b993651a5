//! Hover documentation for custom elements.
//!
//! # Hover Targets
//!
//! | Target | Shows |
//! |--------|-------|
//! | Tag name in an opening tag | Class, summary, description, deprecation, attributes |
//! | Attribute-position token | Kind of binding, type, default, description, deprecation |
//!
//! Tokens resolve through the binding rules, so `.value`, `?disabled` and `@x-click` show
//! the property, boolean attribute and event they bind.
//!
//! # Configuration
//!
//! Hover can be disabled via [`Settings::hover`]:
//!
//! ```json
//! { "hover": false }
//! ```

use std::ops::Range;

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::{
    binding::{resolve, Resolved},
    config::Settings,
    diagnostics::scanner::scan_attributes,
    document::Document,
    markup::{walk, MarkupNode, MarkupParser, TagScanner},
    registry::{ComponentMetadata, Deprecation, Registry},
};

/// What the cursor rests on inside markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Tag {
        tag: String,
        range: Range<usize>,
    },
    Attribute {
        tag: String,
        token: String,
        range: Range<usize>,
    },
}

fn touches(range: &Range<usize>, offset: usize) -> bool {
    range.start <= offset && offset <= range.end
}

/// Finds the tag name or attribute token at `offset`.
pub(crate) fn target_at(text: &str, offset: usize) -> Option<Target> {
    let nodes = TagScanner.parse(text);
    let mut found = None;
    walk(&nodes, |node| {
        if let MarkupNode::Element(element) = node {
            if found.is_none() && touches(&element.open_tag, offset) {
                found = Some(element);
            }
        }
    });
    let element = found?;
    let tag = element.tag.to_ascii_lowercase();

    if touches(&element.tag_range, offset) {
        return Some(Target::Tag {
            tag,
            range: element.tag_range.clone(),
        });
    }

    scan_attributes(text, element.open_tag.clone())
        .into_iter()
        .find(|occurrence| touches(&occurrence.name_range, offset))
        .map(|occurrence| Target::Attribute {
            tag,
            token: occurrence.name.to_string(),
            range: occurrence.name_range,
        })
}

fn deprecation_note(deprecated: Option<&Deprecation>) -> Option<String> {
    deprecated.map(|deprecation| match deprecation.message() {
        Some(message) => format!("**Deprecated:** {message}"),
        None => "**Deprecated**".to_string(),
    })
}

fn component_markdown(component: &ComponentMetadata) -> String {
    let mut heading = format!("**`<{}>`**", component.tag);
    if let Some(class_name) = &component.class_name {
        heading.push_str(&format!(" `{class_name}`"));
    }

    let mut sections = vec![heading];
    sections.extend(deprecation_note(component.deprecated.as_ref()));
    sections.extend(component.summary.clone());
    sections.extend(component.description.clone());

    if !component.attributes.is_empty() {
        let rows = component
            .attributes
            .iter()
            .map(|attribute| {
                format!(
                    "| `{}` | `{}` | {} |",
                    attribute.name,
                    attribute
                        .type_text
                        .clone()
                        .unwrap_or_else(|| attribute.value_kind.describe())
                        .replace('|', "\\|"),
                    attribute.description.as_deref().unwrap_or_default().replace('\n', " ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("| Attribute | Type | Description |\n|---|---|---|\n{rows}"));
    }

    sections.join("\n\n")
}

fn member_markdown(tag: &str, resolved: Resolved) -> String {
    let (what, type_text, default, description, deprecated) = match resolved {
        Resolved::Attribute(attribute) => (
            "attribute",
            Some(attribute.type_text.clone().unwrap_or_else(|| attribute.value_kind.describe())),
            attribute.default.as_deref(),
            attribute.description.as_deref(),
            attribute.deprecated.as_ref(),
        ),
        Resolved::Property(property) => (
            if property.readonly { "readonly property" } else { "property" },
            Some(property.type_text.clone().unwrap_or_else(|| property.value_kind.describe())),
            None,
            property.description.as_deref(),
            property.deprecated.as_ref(),
        ),
        Resolved::Event(event) => (
            "event",
            event.type_text.clone(),
            None,
            event.description.as_deref(),
            event.deprecated.as_ref(),
        ),
    };

    let mut sections = vec![format!("**{}** {what} of `<{tag}>`", resolved.name())];
    sections.extend(deprecation_note(deprecated));
    sections.extend(type_text.map(|type_text| format!("Type: `{type_text}`")));
    sections.extend(default.map(|default| format!("Default: `{default}`")));
    sections.extend(description.map(str::to_string));
    sections.join("\n\n")
}

/// Hover for the tag or attribute token at `position`.
///
/// Returns `None` when hover is disabled, the cursor is outside an opening tag, or the
/// element or token is not in the registry.
pub fn hover(registry: &Registry, settings: &Settings, document: &Document, position: Position) -> Option<Hover> {
    if !settings.hover {
        return None;
    }

    let offset = document.offset(position)?;
    let (value, range) = match target_at(document.text(), offset)? {
        Target::Tag { tag, range } => (component_markdown(registry.component(&tag)?), range),
        Target::Attribute { tag, token, range } => {
            let resolved = resolve(registry, &tag, &token)?;
            (member_markdown(&tag, resolved), range)
        }
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(document.range(range)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture_registry;

    /// Hovers with the cursor at `|` and returns the markdown.
    fn hover_at(text: &str, settings: &Settings) -> Option<String> {
        let offset = text.find('|').expect("cursor marker");
        let document = Document::new(text.replacen('|', "", 1));
        let hover = hover(&fixture_registry(), settings, &document, document.position(offset))?;
        match hover.contents {
            HoverContents::Markup(markup) => Some(markup.value),
            _ => None,
        }
    }

    #[test]
    fn test_tag_hover() {
        let markdown = hover_at("<div><x-bu|tton variant=\"primary\"></x-button></div>", &Settings::default()).unwrap();
        assert!(markdown.starts_with("**`<x-button>`** `XButton`"));
        assert!(markdown.contains("A clickable button."));
        assert!(markdown.contains("| `variant` | `'primary' \\| 'secondary' \\| 'danger'` | Visual style. |"));
    }

    #[test]
    fn test_deprecated_tag_hover() {
        let markdown = hover_at("<x-old-button|></x-old-button>", &Settings::default()).unwrap();
        assert!(markdown.contains("**Deprecated:** Use x-button instead."));

        let markdown = hover_at("<x-leg|acy></x-legacy>", &Settings::default()).unwrap();
        assert!(markdown.contains("**Deprecated**"));
    }

    #[test]
    fn test_attribute_hover() {
        let markdown = hover_at(r#"<x-button vari|ant="primary"></x-button>"#, &Settings::default()).unwrap();
        assert!(markdown.starts_with("**variant** attribute of `<x-button>`"));
        assert!(markdown.contains("Default: `'primary'`"));
        assert!(markdown.contains("Visual style."));

        let markdown = hover_at(r#"<x-button ki|nd="a"></x-button>"#, &Settings::default()).unwrap();
        assert!(markdown.contains("**Deprecated:** Use variant instead."));
    }

    #[test]
    fn test_bound_token_hover() {
        let markdown = hover_at("<x-button .val|ue=${v}></x-button>", &Settings::default()).unwrap();
        assert!(markdown.starts_with("**value** property of `<x-button>`"));

        let markdown = hover_at("<x-button @x-cl|ick=${f}></x-button>", &Settings::default()).unwrap();
        assert!(markdown.starts_with("**x-click** event of `<x-button>`"));
        assert!(markdown.contains("Type: `CustomEvent`"));
    }

    #[test]
    fn test_no_hover() {
        let settings = Settings::default();
        assert_eq!(hover_at("<x-unkn|own></x-unknown>", &settings), None);
        assert_eq!(hover_at("<x-button nope|></x-button>", &settings), None);
        assert_eq!(hover_at("<x-button></x-button> te|xt", &settings), None);

        let disabled = Settings {
            hover: false,
            ..Settings::default()
        };
        assert_eq!(hover_at("<x-bu|tton></x-button>", &disabled), None);
    }

    #[test]
    fn test_hover_range_covers_token() {
        let document = Document::new("<x-button disabled></x-button>");
        let hover = hover(
            &fixture_registry(),
            &Settings::default(),
            &document,
            Position { line: 0, character: 12 },
        )
        .unwrap();
        let range = hover.range.unwrap();
        assert_eq!((range.start.character, range.end.character), (10, 18));
    }
}
