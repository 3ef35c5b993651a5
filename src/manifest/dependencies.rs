//! Dependency manifests declared through `package.json`.
//!
//! Every declared dependency is a potential metadata provider. A package points at its
//! manifest with the `customElements` field; packages without one are probed at the
//! conventional locations. Packages that provide nothing are skipped without noise.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{conventional_manifest, ManifestSource};

pub const PACKAGE_JSON: &str = "package.json";

/// The parts of a `package.json` the loader reads. Dependency maps keep declaration order.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub custom_elements: Option<String>,
    #[serde(default)]
    pub dependencies: Map<String, Value>,
    #[serde(default)]
    pub dev_dependencies: Map<String, Value>,
    #[serde(default)]
    pub peer_dependencies: Map<String, Value>,
}

impl PackageJson {
    /// Reads `<dir>/package.json`. Missing or malformed files read as `None`.
    pub fn read(dir: &Path) -> Option<PackageJson> {
        let text = std::fs::read_to_string(dir.join(PACKAGE_JSON)).ok()?;
        serde_json::from_str(&text)
            .map_err(|err| {
                tracing::debug!(dir = %dir.display(), %err, "unreadable package.json");
            })
            .ok()
    }

    /// Declared dependency names: `dependencies`, then `devDependencies`, then
    /// `peerDependencies`, each in declaration order, without repeats.
    pub fn dependency_names(&self) -> Vec<&str> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .chain(self.peer_dependencies.keys())
            .map(String::as_str)
            .unique()
            .collect()
    }

    /// The manifest a package advertises, resolved against its directory.
    pub fn manifest_path(&self, package_dir: &Path) -> Option<PathBuf> {
        let declared = self.custom_elements.as_deref()?.trim();
        if declared.is_empty() {
            return None;
        }
        Some(package_dir.join(declared.trim_start_matches("./")))
    }
}

/// Finds `node_modules/<name>` in `root` or the nearest ancestor that has it.
pub fn package_dir(root: &Path, name: &str) -> Option<PathBuf> {
    root.ancestors()
        .map(|dir| dir.join("node_modules").join(name))
        .find(|candidate| candidate.is_dir())
}

/// The manifest sources contributed by the project's declared dependencies, in
/// declaration order.
pub fn dependency_sources(root: &Path) -> Vec<ManifestSource> {
    let Some(project) = PackageJson::read(root) else {
        return vec![];
    };

    project
        .dependency_names()
        .into_iter()
        .filter_map(|name| {
            let Some(dir) = package_dir(root, name) else {
                tracing::debug!(package = name, "dependency not installed");
                return None;
            };

            let path = PackageJson::read(&dir)
                .and_then(|package| package.manifest_path(&dir))
                .filter(|path| path.is_file())
                .or_else(|| conventional_manifest(&dir))?;

            Some(ManifestSource::Dependency {
                package: name.to_string(),
                path,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_project_dir, write_dependency};
    use std::fs;

    #[test]
    fn test_dependency_names_keep_declaration_order() {
        let package: PackageJson = serde_json::from_str(
            r#"{
                "name": "app",
                "dependencies": { "zeta-ui": "^1", "alpha-ui": "^2" },
                "devDependencies": { "beta-kit": "^1", "zeta-ui": "^1" }
            }"#,
        )
        .unwrap();
        assert_eq!(
            package.dependency_names(),
            vec!["zeta-ui", "alpha-ui", "beta-kit"]
        );
    }

    #[test]
    fn test_dependency_sources_follow_custom_elements_field() {
        let (_temp_dir, root) = create_test_project_dir();
        fs::write(
            root.join(PACKAGE_JSON),
            r#"{ "name": "app", "dependencies": { "lib-a": "1", "lib-b": "1", "lib-c": "1" } }"#,
        )
        .unwrap();
        write_dependency(&root, "lib-a", Some("meta/cem.json"), "{}");
        write_dependency(&root, "lib-b", None, "{}");
        // lib-c is declared but not installed

        let sources = dependency_sources(&root);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].label(), Some("lib-a"));
        assert!(sources[0]
            .path()
            .unwrap()
            .ends_with("node_modules/lib-a/meta/cem.json"));
        assert_eq!(sources[1].label(), Some("lib-b"));
        assert!(sources[1]
            .path()
            .unwrap()
            .ends_with("node_modules/lib-b/custom-elements.json"));
    }

    #[test]
    fn test_hoisted_node_modules_are_found() {
        let (_temp_dir, root) = create_test_project_dir();
        write_dependency(&root, "lib-a", None, "{}");
        let nested = root.join("packages").join("app");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            package_dir(&nested, "lib-a"),
            Some(root.join("node_modules").join("lib-a"))
        );
    }

    #[test]
    fn test_no_package_json_means_no_dependencies() {
        let (_temp_dir, root) = create_test_project_dir();
        assert!(dependency_sources(&root).is_empty());
    }
}
