//! Typed component metadata produced by the indexer.

use std::collections::HashMap;

use crate::manifest::schema::RawDeprecated;

/// What values an attribute or property accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Number,
    /// Unrestricted text, including open-ended string patterns
    String,
    /// A closed set of string literals, in declaration order without repeats
    Enum(Vec<String>),
}

impl ValueKind {
    pub fn options(&self) -> &[String] {
        match self {
            ValueKind::Enum(options) => options,
            ValueKind::Boolean | ValueKind::Number | ValueKind::String => &[],
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, ValueKind::Boolean)
    }

    /// Short human-readable rendering for hovers and completion details.
    pub fn describe(&self) -> String {
        match self {
            ValueKind::Boolean => "boolean".to_string(),
            ValueKind::Number => "number".to_string(),
            ValueKind::String => "string".to_string(),
            ValueKind::Enum(options) => options
                .iter()
                .map(|option| format!("'{option}'"))
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Deprecation {
    Flag,
    Message(String),
}

impl Deprecation {
    pub fn from_raw(raw: Option<&RawDeprecated>) -> Option<Deprecation> {
        match raw? {
            RawDeprecated::Flag(true) => Some(Deprecation::Flag),
            RawDeprecated::Flag(false) => None,
            RawDeprecated::Message(message) if message.trim().is_empty() => Some(Deprecation::Flag),
            RawDeprecated::Message(message) => Some(Deprecation::Message(message.trim().to_string())),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Deprecation::Flag => None,
            Deprecation::Message(message) => Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMetadata {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: Option<Deprecation>,
    pub default: Option<String>,
    pub field_name: Option<String>,
    pub value_kind: ValueKind,
    /// Raw type text the kind was inferred from
    pub type_text: Option<String>,
    /// Byte offset of the entry in its manifest text
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMetadata {
    pub name: String,
    pub attribute: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<Deprecation>,
    pub readonly: bool,
    pub value_kind: ValueKind,
    pub type_text: Option<String>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMetadata {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: Option<Deprecation>,
    pub type_text: Option<String>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CssHookKind {
    Property,
    Part,
    State,
}

impl CssHookKind {
    /// Renders a hook name in the syntax used to reference it from a stylesheet.
    pub fn reference(&self, name: &str) -> String {
        match self {
            CssHookKind::Property => {
                let name = name.trim_start_matches("--");
                format!("var(--{name})")
            }
            CssHookKind::Part => format!("::part({name})"),
            CssHookKind::State => format!(":state({name})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssHook {
    pub kind: CssHookKind,
    pub name: String,
    pub description: Option<String>,
    pub syntax: Option<String>,
    pub default: Option<String>,
    /// Tag of the component that contributed the hook
    pub tag: String,
}

/// Ordered entries with O(1) lookup by name. The first entry with a given name wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedList<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for NamedList<T> {
    fn default() -> Self {
        NamedList {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> NamedList<T> {
    /// Adds `item` under `name` unless the name is already present.
    pub fn insert(&mut self, name: &str, item: T) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.items.len());
        self.items.push(item);
        true
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&i| &self.items[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a NamedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMetadata {
    /// Exposed tag name, after any configured transform
    pub tag: String,
    pub class_name: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub deprecated: Option<Deprecation>,
    /// Index into [`Registry::sources`](super::Registry::sources)
    pub source: usize,
    /// Owning package label, used for per-package configuration
    pub package: Option<String>,
    pub attributes: NamedList<AttributeMetadata>,
    pub properties: NamedList<PropertyMetadata>,
    pub events: NamedList<EventMetadata>,
    pub css_properties: NamedList<CssHook>,
    pub css_parts: NamedList<CssHook>,
    pub css_states: NamedList<CssHook>,
    pub offset: Option<usize>,
}

impl ComponentMetadata {
    pub fn attribute(&self, name: &str) -> Option<&AttributeMetadata> {
        self.attributes.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.get(name)
    }

    pub fn event(&self, name: &str) -> Option<&EventMetadata> {
        self.events.get(name)
    }

    pub fn css_hooks(&self, kind: CssHookKind) -> &NamedList<CssHook> {
        match kind {
            CssHookKind::Property => &self.css_properties,
            CssHookKind::Part => &self.css_parts,
            CssHookKind::State => &self.css_states,
        }
    }

    /// Summary if present, otherwise the description.
    pub fn short_description(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .or(self.description.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}
