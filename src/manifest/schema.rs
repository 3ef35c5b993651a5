//! Serde records for the Custom Elements Manifest format.
//!
//! Only the parts of the schema the indexer reads are modeled. Declarations are kept as
//! raw JSON values at the module level so one unusable component record does not
//! prevent the rest of the manifest from decoding.

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawManifest {
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub modules: Vec<RawModule>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawModule {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub declarations: Vec<Value>,
}

/// `deprecated` is either `true` or an explanatory message.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawDeprecated {
    Flag(bool),
    Message(String),
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawDeclaration {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub custom_element: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub deprecated: Option<RawDeprecated>,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
    #[serde(default)]
    pub members: Vec<RawMember>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub css_properties: Vec<RawCssHook>,
    #[serde(default)]
    pub css_parts: Vec<RawCssHook>,
    #[serde(default)]
    pub css_states: Vec<RawCssHook>,
}

/// Type-bearing fields (`type`, `parsedType`, ...) are looked up by name in `fields`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawAttribute {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: Option<RawDeprecated>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawMember {
    #[serde(default)]
    pub kind: Option<String>,
    pub name: String,
    #[serde(default)]
    pub privacy: Option<String>,
    #[serde(default, rename = "static")]
    pub is_static: Option<bool>,
    #[serde(default)]
    pub readonly: Option<bool>,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: Option<RawDeprecated>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawEvent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: Option<RawDeprecated>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawCssHook {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub syntax: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
}

/// Reads the `text` of a type-bearing field, e.g. `"type": { "text": "'a' | 'b'" }`.
///
/// A bare string is accepted as well since some generators emit one.
pub fn type_text<'a>(fields: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    match fields.get(field)? {
        Value::Object(object) => object.get("text")?.as_str(),
        Value::String(text) => Some(text.as_str()),
        _ => None,
    }
    .filter(|text| !text.trim().is_empty())
}

impl RawManifest {
    pub fn parse(text: &str) -> Result<RawManifest, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Declarations with a tag name, paired with their decode result.
    pub fn tagged_declarations(
        &self,
    ) -> impl Iterator<Item = Result<RawDeclaration, (String, serde_json::Error)>> + '_ {
        self.modules
            .iter()
            .flat_map(|module| module.declarations.iter())
            .filter(|value| value.get("tagName").is_some())
            .map(|value| {
                RawDeclaration::deserialize(value).map_err(|err| {
                    let name = value
                        .get("tagName")
                        .and_then(Value::as_str)
                        .or_else(|| value.get("name").and_then(Value::as_str))
                        .unwrap_or("<unnamed>")
                        .to_string();
                    (name, err)
                })
            })
    }
}
