//! Manifest discovery and loading.
//!
//! A load cycle gathers manifests from three kinds of sources, in precedence order:
//!
//! 1. the local project manifest (see [`discover`]),
//! 2. each declared dependency that ships one (see [`load_dependencies`]),
//! 3. configured remote manifests (see [`load_remote`]).
//!
//! Every source fails on its own. A missing file is skipped silently; malformed content
//! or a failed fetch is logged and skipped. Nothing here aborts the cycle.

pub mod dependencies;
pub mod remote;
pub mod schema;

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::{config::Settings, error::LoadError};

use self::{dependencies::PackageJson, schema::RawManifest};

/// Locations probed for a manifest, relative to a project or package directory.
pub const CONVENTIONAL_LOCATIONS: &[&str] = &[
    "custom-elements.json",
    "dist/custom-elements.json",
    "build/custom-elements.json",
    "lib/custom-elements.json",
    "out/custom-elements.json",
    "src/custom-elements.json",
];

/// Where a manifest came from. The label scopes per-package configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ManifestSource {
    Local {
        path: PathBuf,
        package: Option<String>,
    },
    Dependency {
        package: String,
        path: PathBuf,
    },
    Remote {
        url: String,
        label: Option<String>,
    },
}

impl ManifestSource {
    pub fn label(&self) -> Option<&str> {
        match self {
            ManifestSource::Local { package, .. } => package.as_deref(),
            ManifestSource::Dependency { package, .. } => Some(package),
            ManifestSource::Remote { label, .. } => label.as_deref(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ManifestSource::Local { path, .. } | ManifestSource::Dependency { path, .. } => {
                Some(path)
            }
            ManifestSource::Remote { .. } => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ManifestSource::Local { .. })
    }
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestSource::Local { path, .. } => write!(f, "{}", path.display()),
            ManifestSource::Dependency { package, path } => {
                write!(f, "{package} ({})", path.display())
            }
            ManifestSource::Remote { url, .. } => write!(f, "{url}"),
        }
    }
}

/// A decoded manifest together with its raw text, kept for definition lookups.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub source: ManifestSource,
    pub text: Arc<str>,
    pub manifest: RawManifest,
}

impl LoadedManifest {
    pub fn parse(source: ManifestSource, text: impl Into<Arc<str>>) -> Result<Self, LoadError> {
        let text = text.into();
        let manifest = RawManifest::parse(&text).map_err(|e| LoadError::parse(source.to_string(), e))?;
        Ok(LoadedManifest {
            source,
            text,
            manifest,
        })
    }
}

/// The first conventional manifest location that exists under `dir`.
pub fn conventional_manifest(dir: &Path) -> Option<PathBuf> {
    CONVENTIONAL_LOCATIONS
        .iter()
        .map(|location| dir.join(location))
        .find(|candidate| candidate.is_file())
}

/// Resolves the project's own manifest.
///
/// An explicit `manifest_src` wins (a URL yields a remote source), then the project
/// `package.json` `customElements` field, then the conventional locations.
pub fn discover(root: &Path, settings: &Settings) -> Option<ManifestSource> {
    let package = PackageJson::read(root);
    let package_name = package.as_ref().and_then(|package| package.name.clone());

    if let Some(src) = settings.manifest_src.as_deref().map(str::trim) {
        if remote::is_remote(src) {
            return Some(ManifestSource::Remote {
                url: src.to_string(),
                label: package_name,
            });
        }
        return Some(ManifestSource::Local {
            path: root.join(src),
            package: package_name,
        });
    }

    let path = package
        .as_ref()
        .and_then(|package| package.manifest_path(root))
        .filter(|path| path.is_file())
        .or_else(|| conventional_manifest(root))?;

    Some(ManifestSource::Local {
        path,
        package: package_name,
    })
}

/// Loads a single source.
pub async fn load(source: ManifestSource, timeout: Duration) -> Result<LoadedManifest, LoadError> {
    match &source {
        ManifestSource::Remote { url, .. } => {
            let text = remote::fetch(url, timeout).await?;
            LoadedManifest::parse(source, text)
        }
        ManifestSource::Local { path, .. } | ManifestSource::Dependency { path, .. } => {
            let text = read_manifest_file(path)?;
            LoadedManifest::parse(source, text)
        }
    }
}

fn read_manifest_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => LoadError::SourceNotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Loads every declared dependency's manifest. Failures are skipped quietly since
/// dependencies are optional metadata providers.
pub fn load_dependencies(root: &Path) -> Vec<LoadedManifest> {
    dependencies::dependency_sources(root)
        .into_iter()
        .filter_map(|source| {
            let path = source.path()?.to_path_buf();
            read_manifest_file(&path)
                .and_then(|text| LoadedManifest::parse(source, text))
                .map_err(|err| tracing::debug!(%err, "skipping dependency manifest"))
                .ok()
        })
        .collect()
}

/// Fetches one remote manifest, logging and discarding failures.
pub async fn load_remote(url: &str, label: Option<&str>, timeout: Duration) -> Option<LoadedManifest> {
    let source = ManifestSource::Remote {
        url: url.to_string(),
        label: label.map(str::to_string),
    };
    load(source, timeout)
        .await
        .map_err(|err| tracing::warn!(%err, "skipping remote manifest"))
        .ok()
}

/// Runs one full load cycle: local, dependencies, then remote sources.
pub async fn load_all(root: &Path, settings: &Settings) -> Vec<LoadedManifest> {
    let mut loaded = Vec::new();

    match discover(root, settings) {
        Some(source) => match load(source, settings.remote_timeout()).await {
            Ok(manifest) => loaded.push(manifest),
            Err(err) if err.is_silent() => tracing::debug!(%err, "no local manifest"),
            Err(err) => tracing::warn!(%err, "skipping local manifest"),
        },
        None => tracing::debug!(root = %root.display(), "no local manifest found"),
    }

    loaded.extend(load_dependencies(root));

    for remote in &settings.remote_manifests {
        if let Some(manifest) =
            load_remote(&remote.url, remote.label.as_deref(), settings.remote_timeout()).await
        {
            loaded.push(manifest);
        }
    }

    tracing::info!(sources = loaded.len(), "manifests loaded");
    loaded
}
