use std::{collections::HashMap, path::Path, str::FromStr};

use anyhow::anyhow;
use config::{Config, File};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;

use crate::diagnostics::RuleId;

/// Type field consulted before `type` when no `type_src` is configured.
pub const DEFAULT_TYPE_SRC: &str = "parsedType";

/// Name (without extension) of the project configuration file.
pub const CONFIG_FILE_STEM: &str = "wc.config";

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Explicit manifest path (relative to the project root) or `http(s)` URL
    #[serde(default)]
    pub manifest_src: Option<String>,
    /// Globs of documents that receive diagnostics; empty means everything
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Manifest field holding the preferred type text, tried before `type`
    #[serde(default)]
    pub type_src: Option<String>,
    /// Tag rename template, `{tag}` is replaced by the manifest tag name
    #[serde(default)]
    pub tag_format: Option<String>,
    /// Rule id -> `error | warning | info | hint | off`
    #[serde(default)]
    pub diagnostic_severity: HashMap<String, String>,
    /// Per-package overrides keyed by package name
    #[serde(default)]
    pub libraries: HashMap<String, LibrarySettings>,
    #[serde(default)]
    pub remote_manifests: Vec<RemoteManifest>,
    pub remote_timeout_ms: u64,
    pub debounce_ms: u64,
    pub hover: bool,
    pub diagnostics: bool,
}

/// Override block for a single package. Unset fields fall back to the global block.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LibrarySettings {
    /// Globs over tag names this package may contribute
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub type_src: Option<String>,
    pub tag_format: Option<String>,
    pub diagnostic_severity: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteManifest {
    pub url: String,
    /// Package label used for per-package overrides
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
    Off,
}

impl FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" | "information" => Ok(Severity::Info),
            "hint" => Ok(Severity::Hint),
            "off" | "none" => Ok(Severity::Off),
            other => Err(anyhow!("unknown severity '{other}'")),
        }
    }
}

impl Severity {
    /// Parses a configured severity. Invalid values degrade to `Error` with a warning.
    pub fn coerce(value: &str, rule: &str) -> Severity {
        value.parse().unwrap_or_else(|err| {
            tracing::warn!(rule, %err, "invalid severity in configuration, using 'error'");
            Severity::Error
        })
    }
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/wcls/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/{CONFIG_FILE_STEM}",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("remote_timeout_ms", 10_000)?
            .set_default("debounce_ms", 300)?
            .set_default("hover", true)?
            .set_default("diagnostics", true)?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }

    fn library(&self, package: Option<&str>) -> Option<&LibrarySettings> {
        package.and_then(|package| self.libraries.get(package))
    }

    /// Resolves a rule severity: package override, then project override, then the rule default.
    pub fn severity(&self, rule: RuleId, package: Option<&str>) -> Severity {
        let configured = |map: &HashMap<String, String>| {
            map.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(rule.name()))
                .map(|(_, value)| Severity::coerce(value, rule.name()))
        };

        self.library(package)
            .and_then(|library| configured(&library.diagnostic_severity))
            .or_else(|| configured(&self.diagnostic_severity))
            .unwrap_or_else(|| rule.default_severity())
    }

    /// The ordered type-bearing fields consulted for a package's metadata.
    pub fn type_fields(&self, package: Option<&str>) -> [&str; 2] {
        let preferred = self
            .library(package)
            .and_then(|library| library.type_src.as_deref())
            .or(self.type_src.as_deref())
            .unwrap_or(DEFAULT_TYPE_SRC);
        [preferred, "type"]
    }

    /// Applies the package's tag rename template, falling back to the global one.
    pub fn transform_tag(&self, tag: &str, package: Option<&str>) -> String {
        let template = self
            .library(package)
            .and_then(|library| library.tag_format.as_deref())
            .or(self.tag_format.as_deref());

        match template {
            Some(template) if template.contains("{tag}") => template.replace("{tag}", tag),
            _ => tag.to_string(),
        }
    }

    /// Path filter for documents that receive diagnostics.
    pub fn document_filter(&self) -> GlobFilter {
        GlobFilter::new(&self.include, &self.exclude)
    }

    /// Tag-name filter for components contributed by `package`.
    pub fn tag_filter(&self, package: Option<&str>) -> GlobFilter {
        match self.library(package) {
            Some(library) => GlobFilter::new(&library.include, &library.exclude),
            None => GlobFilter::default(),
        }
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }

    pub fn remote_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.remote_timeout_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            manifest_src: None,
            include: vec![],
            exclude: vec![],
            type_src: None,
            tag_format: None,
            diagnostic_severity: HashMap::new(),
            libraries: HashMap::new(),
            remote_manifests: vec![],
            remote_timeout_ms: 10_000,
            debounce_ms: 300,
            hover: true,
            diagnostics: true,
        }
    }
}

/// Compiled include/exclude globs. An empty include list admits everything.
#[derive(Debug, Clone, Default)]
pub struct GlobFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl GlobFilter {
    pub fn new(include: &[String], exclude: &[String]) -> GlobFilter {
        GlobFilter {
            include: compile_globs(include),
            exclude: compile_globs(exclude),
        }
    }

    pub fn is_match(&self, candidate: impl AsRef<Path>) -> bool {
        let candidate = candidate.as_ref();
        let included = self
            .include
            .as_ref()
            .map_or(true, |set| set.is_match(candidate));
        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|set| set.is_match(candidate));
        included && !excluded
    }
}

fn compile_globs(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => tracing::warn!(pattern = %pattern, %err, "ignoring invalid glob"),
        }
    }

    builder
        .build()
        .map_err(|err| tracing::warn!(%err, "failed to compile glob set"))
        .ok()
}
