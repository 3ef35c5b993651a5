//! Shared test utilities.
//!
//! This module provides project fixtures and registry builders used across multiple
//! test modules. It is only compiled when running tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::Settings;
use crate::manifest::{LoadedManifest, ManifestSource};
use crate::registry::Registry;

/// Creates a temporary project directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the project subdirectory
///
/// The project lives in a non-hidden subdirectory so workspace walks, which skip
/// dot-directories, still see it when the temp root is something like `/tmp/.tmpXXXX`.
pub fn create_test_project_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let project_dir = temp_dir.path().join("project");
    fs::create_dir(&project_dir).expect("Failed to create project subdirectory");
    (temp_dir, project_dir)
}

/// Installs a fake package under `node_modules/<name>`.
///
/// With `custom_elements` set, the package's `package.json` points at that path and the
/// manifest is written there; otherwise the manifest lands at `custom-elements.json`.
pub fn write_dependency(root: &Path, name: &str, custom_elements: Option<&str>, manifest: &str) {
    let package_dir = root.join("node_modules").join(name);
    fs::create_dir_all(&package_dir).expect("Failed to create package directory");

    let package_json = match custom_elements {
        Some(path) => format!(r#"{{ "name": "{name}", "customElements": "{path}" }}"#),
        None => format!(r#"{{ "name": "{name}" }}"#),
    };
    fs::write(package_dir.join("package.json"), package_json).expect("Failed to write package.json");

    let manifest_path = package_dir.join(custom_elements.unwrap_or("custom-elements.json"));
    if let Some(parent) = manifest_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create manifest directory");
    }
    fs::write(manifest_path, manifest).expect("Failed to write manifest");
}

/// Builds manifest JSON with one declaration per `(tag, attributes)` pair, where
/// `attributes` is a JSON array literal.
pub fn manifest_json(components: &[(&str, &str)]) -> String {
    let declarations = components
        .iter()
        .map(|(tag, attributes)| {
            format!(r#"{{ "kind": "class", "tagName": "{tag}", "customElement": true, "attributes": {attributes} }}"#)
        })
        .collect::<Vec<_>>()
        .join(",\n");
    wrap_declarations(&declarations)
}

/// Wraps comma-separated declaration objects in a single-module manifest.
pub fn wrap_declarations(declarations: &str) -> String {
    format!(
        r#"{{
  "schemaVersion": "1.0.0",
  "modules": [
    {{
      "kind": "javascript-module",
      "path": "src/index.js",
      "declarations": [
{declarations}
      ]
    }}
  ]
}}"#
    )
}

pub fn loaded_manifest(source: ManifestSource, json: &str) -> LoadedManifest {
    LoadedManifest::parse(source, json).expect("Failed to parse test manifest")
}

/// A registry holding `declarations` as the local project manifest.
pub fn registry_from_declarations(declarations: &str) -> Registry {
    registry_with_settings(declarations, &Settings::default())
}

pub fn registry_with_settings(declarations: &str, settings: &Settings) -> Registry {
    let manifest = loaded_manifest(
        ManifestSource::Local {
            path: PathBuf::from("/project/custom-elements.json"),
            package: Some("app".into()),
        },
        &wrap_declarations(declarations),
    );
    Registry::build(vec![manifest], settings)
}

/// Components used by completion, diagnostics and hover tests.
///
/// ```text
/// x-button      variant: 'primary' | 'secondary' | 'danger'
///               disabled: boolean
///               size: number
///               label: string
///               kind: deprecated ("Use variant instead.")
///               tone: 'a' | (string & {})
///               .value property, @x-click event, CSS hooks
/// x-old-button  deprecated element with message
/// x-legacy      deprecated element without message
/// ```
pub const FIXTURE_DECLARATIONS: &str = r#"{
  "kind": "class",
  "name": "XButton",
  "tagName": "x-button",
  "customElement": true,
  "summary": "A clickable button.",
  "description": "Buttons trigger actions.",
  "attributes": [
    { "name": "variant", "description": "Visual style.", "type": { "text": "'primary' | 'secondary' | 'danger'" }, "default": "'primary'" },
    { "name": "disabled", "description": "Disables the button.", "type": { "text": "boolean" } },
    { "name": "size", "type": { "text": "number" } },
    { "name": "label", "type": { "text": "string" } },
    { "name": "kind", "type": { "text": "string" }, "deprecated": "Use variant instead." },
    { "name": "tone", "type": { "text": "'a' | (string & {})" } }
  ],
  "members": [
    { "kind": "field", "name": "value", "type": { "text": "string" }, "description": "Current value." },
    { "kind": "field", "name": "variant", "type": { "text": "'primary' | 'secondary' | 'danger'" }, "attribute": "variant" }
  ],
  "events": [
    { "name": "x-click", "description": "Fired on activation.", "type": { "text": "CustomEvent" } }
  ],
  "cssProperties": [
    { "name": "--x-button-color", "description": "Text color." }
  ],
  "cssParts": [
    { "name": "label", "description": "The label wrapper." }
  ],
  "cssStates": [
    { "name": "pressed" }
  ]
},
{
  "kind": "class",
  "name": "XOldButton",
  "tagName": "x-old-button",
  "customElement": true,
  "deprecated": "Use x-button instead.",
  "attributes": [
    { "name": "variant", "type": { "text": "string" } }
  ]
},
{
  "kind": "class",
  "name": "XLegacy",
  "tagName": "x-legacy",
  "customElement": true,
  "deprecated": true
}"#;

pub fn fixture_registry() -> Registry {
    registry_from_declarations(FIXTURE_DECLARATIONS)
}
