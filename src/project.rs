//! Per-project state and reload coordination.
//!
//! A [`ProjectContext`] owns the settings and the current [`ProjectSnapshot`] for one
//! project root. Readers take a snapshot and work on it without locks; a reload builds a
//! complete new registry and swaps it in, so a reader sees either the old snapshot or the
//! new one, never a mix.
//!
//! Reloads are coalesced. Each request takes a ticket; the task holding the load lock keeps
//! rebuilding until every ticket issued so far is covered, and callers queued behind it
//! find their ticket already served. Bursts of file events go through
//! [`ProjectContext::schedule_reload`], which debounces them into a single reload.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use arc_swap::ArcSwap;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tower_lsp::lsp_types::{CompletionResponse, Diagnostic, Hover, Location, Position};

use crate::{
    completion::{self, CompletionCache},
    config::{Settings, CONFIG_FILE_STEM},
    diagnostics,
    document::Document,
    gotodef, hover, manifest,
    manifest::dependencies::PACKAGE_JSON,
    markup::MarkupParser,
    registry::Registry,
};

/// An immutable registry together with the caches derived from it.
#[derive(Debug)]
pub struct ProjectSnapshot {
    registry: Arc<Registry>,
    completions: CompletionCache,
    generation: u64,
}

impl ProjectSnapshot {
    pub fn new(registry: Registry, generation: u64) -> ProjectSnapshot {
        let completions = CompletionCache::new(&registry);
        ProjectSnapshot {
            registry: Arc::new(registry),
            completions,
            generation,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn completion_cache(&self) -> &CompletionCache {
        &self.completions
    }

    /// Number of registries published before this one, starting at 0 for the empty registry.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Published through [`ProjectContext::subscribe`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadState {
    /// Generation of the registry currently published
    pub generation: u64,
    pub loading: bool,
    /// Highest reload ticket the published registry covers
    pub served: u64,
}

/// Clears `loading` when a load loop ends, including when its future is dropped midway.
struct LoadingFlag<'a>(&'a watch::Sender<LoadState>);

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0
            .send_if_modified(|state| std::mem::replace(&mut state.loading, false));
    }
}

pub struct ProjectContext {
    root: PathBuf,
    settings: ArcSwap<Settings>,
    snapshot: ArcSwap<ProjectSnapshot>,
    state: watch::Sender<LoadState>,
    /// Reload tickets handed out so far
    requests: AtomicU64,
    load_lock: Mutex<()>,
    /// Bumped by every scheduled reload; only the latest one fires
    debounce: AtomicU64,
}

impl ProjectContext {
    /// Creates a context holding an empty registry. Call [`reload`](Self::reload) to load.
    pub fn new(root: impl Into<PathBuf>, settings: Settings) -> Arc<ProjectContext> {
        let (state, _) = watch::channel(LoadState::default());
        Arc::new(ProjectContext {
            root: root.into(),
            settings: ArcSwap::from_pointee(settings),
            snapshot: ArcSwap::from_pointee(ProjectSnapshot::new(Registry::default(), 0)),
            state,
            requests: AtomicU64::new(0),
            load_lock: Mutex::new(()),
            debounce: AtomicU64::new(0),
        })
    }

    /// Reads the project settings (falling back to defaults) and performs the first load.
    pub async fn open(root: impl Into<PathBuf>) -> Arc<ProjectContext> {
        let root = root.into();
        let settings = Settings::new(&root).unwrap_or_else(|err| {
            tracing::warn!(root = %root.display(), %err, "failed to read settings, using defaults");
            Settings::default()
        });

        let project = ProjectContext::new(root, settings);
        project.reload().await;
        project
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.settings.load_full()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// The current snapshot, once any in-flight load has finished.
    pub async fn snapshot(&self) -> Arc<ProjectSnapshot> {
        let mut state = self.state.subscribe();
        // the sender lives in `self`, so this cannot observe a closed channel
        let _ = state.wait_for(|state| !state.loading).await;
        self.snapshot.load_full()
    }

    /// Reloads every manifest and publishes a new registry.
    ///
    /// Concurrent calls coalesce: a call made while a load is running is served by at most
    /// one extra load, and every call returns once a registry covering it is published.
    pub async fn reload(&self) -> LoadState {
        let ticket = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(ticket, "reload requested");

        let _guard = self.load_lock.lock().await;
        self.run_loads().await;

        let state = *self.state.borrow();
        debug_assert!(state.served >= ticket);
        state
    }

    async fn run_loads(&self) {
        let _loading = LoadingFlag(&self.state);
        loop {
            let target = self.requests.load(Ordering::SeqCst);
            let current = *self.state.borrow();
            if target <= current.served {
                break;
            }

            self.state.send_modify(|state| state.loading = true);

            let settings = self.settings.load_full();
            let manifests = manifest::load_all(&self.root, &settings).await;
            let built = tokio::task::spawn_blocking(move || Registry::build(manifests, &settings)).await;
            let registry = match built {
                Ok(registry) => registry,
                Err(err) => {
                    tracing::error!(%err, "registry build failed, keeping previous registry");
                    self.state.send_modify(|state| state.served = target);
                    continue;
                }
            };
            let generation = current.generation + 1;
            tracing::info!(
                root = %self.root.display(),
                generation,
                components = registry.len(),
                "registry published"
            );

            self.snapshot
                .store(Arc::new(ProjectSnapshot::new(registry, generation)));
            self.state.send_modify(|state| {
                state.generation = generation;
                state.served = target;
            });
        }
    }

    /// Reloads after the debounce window unless another reload is scheduled meanwhile.
    pub fn schedule_reload(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduled = self.debounce.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.settings.load().debounce();
        let project = Arc::clone(self);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if project.debounce.load(Ordering::SeqCst) == scheduled {
                project.reload().await;
            } else {
                tracing::debug!(scheduled, "reload superseded");
            }
        })
    }

    /// Whether a change to `path` can affect the registry or the settings.
    pub fn is_relevant(&self, path: &Path) -> bool {
        let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        if file_name == PACKAGE_JSON || file_name == "custom-elements.json" {
            return true;
        }
        if self.is_config_file(path) {
            return true;
        }

        let snapshot = self.snapshot.load();
        let is_source = snapshot
            .registry()
            .sources()
            .iter()
            .any(|entry| entry.source.path() == Some(path));
        is_source
            || manifest::discover(&self.root, &self.settings.load())
                .is_some_and(|source| source.path() == Some(path))
    }

    fn is_config_file(&self, path: &Path) -> bool {
        path.parent() == Some(self.root.as_path())
            && path.file_stem().and_then(|stem| stem.to_str()) == Some(CONFIG_FILE_STEM)
    }

    /// Handles a file-change notification. Returns the debounced reload when one was
    /// scheduled.
    pub fn file_changed(self: &Arc<Self>, path: &Path) -> Option<JoinHandle<()>> {
        if !self.is_relevant(path) {
            return None;
        }

        if self.is_config_file(path) {
            match Settings::new(&self.root) {
                Ok(settings) => self.settings.store(Arc::new(settings)),
                Err(err) => tracing::warn!(%err, "keeping previous settings"),
            }
        }

        tracing::debug!(path = %path.display(), "scheduling reload");
        Some(self.schedule_reload())
    }

    /// Replaces the settings and reloads with them.
    pub async fn update_settings(&self, settings: Settings) -> LoadState {
        self.settings.store(Arc::new(settings));
        self.reload().await
    }

    /// Diagnostics for a document, or none when the path is outside include/exclude.
    pub async fn diagnostics(
        &self,
        path: &Path,
        text: &str,
        parser: &dyn MarkupParser,
    ) -> Vec<Diagnostic> {
        let snapshot = self.snapshot().await;
        let settings = self.settings();
        let relative = pathdiff::diff_paths(path, &self.root).unwrap_or_else(|| path.to_path_buf());
        if !settings.document_filter().is_match(&relative) {
            return vec![];
        }

        diagnostics::validate_text(snapshot.registry(), &settings, text, parser)
    }

    pub async fn completions(&self, document: &Document, position: Position) -> Option<CompletionResponse> {
        let snapshot = self.snapshot().await;
        completion::get_completions(&snapshot, document, position)
    }

    pub async fn hover(&self, document: &Document, position: Position) -> Option<Hover> {
        let snapshot = self.snapshot().await;
        hover::hover(snapshot.registry(), &self.settings(), document, position)
    }

    pub async fn goto_definition(&self, document: &Document, position: Position) -> Option<Location> {
        let snapshot = self.snapshot().await;
        gotodef::goto_definition(snapshot.registry(), document, position)
    }
}
