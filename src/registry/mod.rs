mod indexer;
mod types;
mod value_kind;

pub use indexer::{apply_tag_transform, is_custom_element_name, normalize, IndexContext};
pub use types::{
    AttributeMetadata, ComponentMetadata, CssHook, CssHookKind, Deprecation, EventMetadata,
    NamedList, PropertyMetadata, ValueKind,
};
pub use value_kind::infer as infer_value_kind;

use std::{collections::HashMap, sync::Arc};

use itertools::Itertools;

use crate::{
    config::Settings,
    locator::FieldIndex,
    manifest::{LoadedManifest, ManifestSource},
};

/// A manifest that contributed to a registry, with the text used for navigation.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub source: ManifestSource,
    pub text: Arc<str>,
}

/// The in-memory index of every known component for one load cycle.
///
/// A registry is immutable once built. Reloading builds a new one; readers holding the
/// old one keep a consistent view. Selection methods do no interpretation of their own,
/// that is left to completion, diagnostics and hover.
#[derive(Debug, Default)]
pub struct Registry {
    components: HashMap<String, ComponentMetadata>,
    /// Tags in insertion order, for stable listings
    order: Vec<String>,
    sources: Vec<SourceEntry>,
    css_properties: NamedList<CssHook>,
    css_parts: NamedList<CssHook>,
    css_states: NamedList<CssHook>,
}

impl Registry {
    /// Indexes `manifests` in precedence order. The first source to define a tag keeps it,
    /// so local manifests must come before dependencies, and dependencies in load order.
    pub fn build(manifests: Vec<LoadedManifest>, settings: &Settings) -> Registry {
        let mut registry = Registry::default();

        // local sources first regardless of the order they were handed in
        let manifests = manifests
            .into_iter()
            .sorted_by_key(|manifest| !manifest.source.is_local());

        for manifest in manifests {
            let source_index = registry.sources.len();
            let package = manifest.source.label().map(str::to_string);
            let tag_filter = settings.tag_filter(package.as_deref());
            let fields = FieldIndex::build(&manifest.text);
            let cx = IndexContext {
                settings,
                source: source_index,
                package: package.as_deref(),
                fields: &fields,
            };

            for declaration in manifest.manifest.tagged_declarations() {
                let declaration = match declaration {
                    Ok(declaration) => declaration,
                    Err((name, err)) => {
                        tracing::warn!(source = %manifest.source, component = %name, %err, "skipping malformed component");
                        continue;
                    }
                };

                let component = match normalize(&declaration, &cx) {
                    Ok(component) => component,
                    Err(err) => {
                        tracing::warn!(source = %manifest.source, %err, "skipping component");
                        continue;
                    }
                };

                if !tag_filter.is_match(&component.tag) {
                    tracing::debug!(tag = %component.tag, "excluded by package filter");
                    continue;
                }

                registry.insert(component);
            }

            registry.sources.push(SourceEntry {
                source: manifest.source,
                text: manifest.text,
            });
        }

        tracing::debug!(
            components = registry.components.len(),
            sources = registry.sources.len(),
            "registry built"
        );
        registry
    }

    fn insert(&mut self, component: ComponentMetadata) {
        if self.components.contains_key(&component.tag) {
            tracing::debug!(tag = %component.tag, "tag already defined by an earlier source");
            return;
        }

        for (pool, hooks) in [
            (&mut self.css_properties, &component.css_properties),
            (&mut self.css_parts, &component.css_parts),
            (&mut self.css_states, &component.css_states),
        ] {
            for hook in hooks {
                pool.insert(&hook.name, hook.clone());
            }
        }

        self.order.push(component.tag.clone());
        self.components.insert(component.tag.clone(), component);
    }

    pub fn component(&self, tag: &str) -> Option<&ComponentMetadata> {
        self.components.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.components.contains_key(tag)
    }

    pub fn attribute(&self, tag: &str, name: &str) -> Option<&AttributeMetadata> {
        self.component(tag)?.attribute(name)
    }

    pub fn property(&self, tag: &str, name: &str) -> Option<&PropertyMetadata> {
        self.component(tag)?.property(name)
    }

    pub fn event(&self, tag: &str, name: &str) -> Option<&EventMetadata> {
        self.component(tag)?.event(name)
    }

    /// Components in insertion (precedence) order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentMetadata> {
        self.order.iter().filter_map(|tag| self.components.get(tag))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn sources(&self) -> &[SourceEntry] {
        &self.sources
    }

    pub fn source_of(&self, component: &ComponentMetadata) -> Option<&SourceEntry> {
        self.sources.get(component.source)
    }

    /// Workspace-wide hook pool for `kind`; the first component to declare a name owns it.
    pub fn css_pool(&self, kind: CssHookKind) -> &NamedList<CssHook> {
        match kind {
            CssHookKind::Property => &self.css_properties,
            CssHookKind::Part => &self.css_parts,
            CssHookKind::State => &self.css_states,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::LibrarySettings, test_utils::loaded_manifest};
    use std::path::PathBuf;

    fn local(json: &str) -> LoadedManifest {
        loaded_manifest(
            ManifestSource::Local {
                path: PathBuf::from("/project/custom-elements.json"),
                package: Some("app".into()),
            },
            json,
        )
    }

    fn dependency(package: &str, json: &str) -> LoadedManifest {
        loaded_manifest(
            ManifestSource::Dependency {
                package: package.into(),
                path: PathBuf::from(format!("/project/node_modules/{package}/custom-elements.json")),
            },
            json,
        )
    }

    fn manifest(declarations: &str) -> String {
        format!(r#"{{ "schemaVersion": "1.0.0", "modules": [{{ "kind": "javascript-module", "declarations": [{declarations}] }}] }}"#)
    }

    #[test]
    fn test_disjoint_sources_sum() {
        let registry = Registry::build(
            vec![
                local(&manifest(r#"{ "tagName": "app-shell" }, { "tagName": "app-nav" }"#)),
                dependency("lib-a", &manifest(r#"{ "tagName": "a-button" }"#)),
                dependency("lib-b", &manifest(r#"{ "tagName": "b-card" }, { "tagName": "b-chip" }"#)),
            ],
            &Settings::default(),
        );
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.sources().len(), 3);
        assert_eq!(
            registry.tags().collect::<Vec<_>>(),
            vec!["app-shell", "app-nav", "a-button", "b-card", "b-chip"]
        );
    }

    #[test]
    fn test_local_source_takes_precedence() {
        let registry = Registry::build(
            vec![
                dependency(
                    "lib-a",
                    &manifest(r#"{ "tagName": "x-button", "description": "from lib-a" }"#),
                ),
                local(&manifest(r#"{ "tagName": "x-button", "description": "local" }"#)),
            ],
            &Settings::default(),
        );
        assert_eq!(registry.len(), 1);
        let component = registry.component("x-button").unwrap();
        assert_eq!(component.description.as_deref(), Some("local"));
        assert_eq!(component.package.as_deref(), Some("app"));
        assert!(registry.source_of(component).unwrap().source.is_local());
    }

    #[test]
    fn test_first_dependency_wins() {
        let registry = Registry::build(
            vec![
                dependency("lib-a", &manifest(r#"{ "tagName": "x-button", "description": "a" }"#)),
                dependency("lib-b", &manifest(r#"{ "tagName": "x-button", "description": "b" }"#)),
            ],
            &Settings::default(),
        );
        assert_eq!(
            registry.component("x-button").unwrap().description.as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_malformed_component_does_not_drop_siblings() {
        let registry = Registry::build(
            vec![local(&manifest(
                r#"{ "tagName": "x-ok" }, { "tagName": "x-bad", "attributes": "nope" }, { "tagName": "NotCustom" }, { "tagName": "x-ok-too" }"#,
            ))],
            &Settings::default(),
        );
        assert_eq!(registry.tags().collect::<Vec<_>>(), vec!["x-ok", "x-ok-too"]);
    }

    #[test]
    fn test_css_pools_first_writer_wins() {
        let registry = Registry::build(
            vec![
                local(&manifest(
                    r#"{ "tagName": "x-a", "cssProperties": [{ "name": "--color", "description": "from a" }], "cssParts": [{ "name": "base" }] },
                       { "tagName": "x-b", "cssProperties": [{ "name": "--color", "description": "from b" }, { "name": "--gap" }], "cssStates": [{ "name": "open" }] }"#,
                )),
            ],
            &Settings::default(),
        );
        let pool = registry.css_pool(CssHookKind::Property);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get("--color").unwrap().tag, "x-a");
        assert_eq!(registry.css_pool(CssHookKind::Part).len(), 1);
        assert_eq!(registry.css_pool(CssHookKind::State).len(), 1);
    }

    #[test]
    fn test_package_tag_filter() {
        let mut settings = Settings::default();
        settings.libraries.insert(
            "lib-a".into(),
            LibrarySettings {
                exclude: vec!["*-internal".into()],
                ..Default::default()
            },
        );
        let registry = Registry::build(
            vec![dependency(
                "lib-a",
                &manifest(r#"{ "tagName": "a-button" }, { "tagName": "a-internal" }"#),
            )],
            &settings,
        );
        assert!(registry.contains("a-button"));
        assert!(!registry.contains("a-internal"));
    }

    #[test]
    fn test_option_accessors() {
        let registry = Registry::build(
            vec![local(&manifest(
                r#"{ "tagName": "x-a", "attributes": [{ "name": "open" }], "events": [{ "name": "change" }] }"#,
            ))],
            &Settings::default(),
        );
        assert!(registry.attribute("x-a", "open").is_some());
        assert!(registry.attribute("x-a", "closed").is_none());
        assert!(registry.attribute("x-missing", "open").is_none());
        assert!(registry.event("x-a", "change").is_some());
        assert!(registry.property("x-a", "open").is_none());
    }
}
