use tower_lsp::lsp_types::{Location, Position, Url};

use crate::{
    binding::{resolve, Resolved},
    document::Document,
    hover::{target_at, Target},
    locator::field_range,
    registry::Registry,
};

/// Manifest location declaring the tag or attribute token at `position`.
///
/// Remote manifests have no file to point at, so their components yield `None`.
pub fn goto_definition(registry: &Registry, document: &Document, position: Position) -> Option<Location> {
    let offset = document.offset(position)?;

    let (component, declaration) = match target_at(document.text(), offset)? {
        Target::Tag { tag, .. } => {
            let component = registry.component(&tag)?;
            (component, component.offset?)
        }
        Target::Attribute { tag, token, .. } => {
            let component = registry.component(&tag)?;
            let declaration = match resolve(registry, &tag, &token)? {
                Resolved::Attribute(attribute) => attribute.offset,
                Resolved::Property(property) => property.offset,
                Resolved::Event(event) => event.offset,
            };
            (component, declaration?)
        }
    };

    let source = registry.source_of(component)?;
    let uri = Url::from_file_path(source.source.path()?).ok()?;
    Some(Location {
        uri,
        range: field_range(&source.text, declaration),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Settings,
        manifest::{LoadedManifest, ManifestSource},
        test_utils::{create_test_project_dir, manifest_json},
    };
    use std::fs;

    fn position_of(document: &Document, needle: &str) -> Position {
        document.position(document.text().find(needle).unwrap() + 1)
    }

    #[test]
    fn test_goto_tag_and_attribute_declarations() {
        let (_temp_dir, root) = create_test_project_dir();
        let manifest_path = root.join("custom-elements.json");
        let json = manifest_json(&[
            ("x-card", r#"[{ "name": "elevation", "type": { "text": "number" } }]"#),
            ("x-badge", "[]"),
        ]);
        fs::write(&manifest_path, &json).unwrap();

        let manifest = LoadedManifest::parse(
            ManifestSource::Local {
                path: manifest_path.clone(),
                package: None,
            },
            json.as_str(),
        )
        .unwrap();
        let registry = Registry::build(vec![manifest], &Settings::default());
        let document = Document::new(r#"<x-badge></x-badge><x-card elevation="2"></x-card>"#);

        let location = goto_definition(&registry, &document, position_of(&document, "x-card")).unwrap();
        assert_eq!(location.uri, Url::from_file_path(&manifest_path).unwrap());
        let tag_offset = json.find(r#""tagName": "x-card""#).unwrap();
        assert_eq!(location.range.start, crate::locator::offset_to_position(&json, tag_offset));

        let location = goto_definition(&registry, &document, position_of(&document, "elevation")).unwrap();
        let attribute_offset = json.find(r#""name": "elevation""#).unwrap();
        assert_eq!(location.range.start, crate::locator::offset_to_position(&json, attribute_offset));
        assert_eq!(
            location.range.end,
            crate::locator::offset_to_position(&json, attribute_offset + r#""name": "elevation""#.len())
        );
    }

    #[test]
    fn test_remote_and_unknown_have_no_definition() {
        let json = manifest_json(&[("x-remote", "[]")]);
        let manifest = LoadedManifest::parse(
            ManifestSource::Remote {
                url: "https://cdn.example.com/custom-elements.json".into(),
                label: None,
            },
            json.as_str(),
        )
        .unwrap();
        let registry = Registry::build(vec![manifest], &Settings::default());

        let document = Document::new("<x-remote></x-remote><x-other></x-other>");
        assert_eq!(goto_definition(&registry, &document, position_of(&document, "x-remote")), None);
        assert_eq!(goto_definition(&registry, &document, position_of(&document, "x-other")), None);
    }
}
