//! Batch validation of every markup document under a project root.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tower_lsp::lsp_types::Diagnostic;
use walkdir::WalkDir;

use crate::{config::Settings, diagnostics::validate_text, markup::MarkupParser, project::ProjectSnapshot};

/// File extensions that may contain custom-element markup.
pub const MARKUP_EXTENSIONS: &[&str] = &[
    "html", "htm", "js", "mjs", "ts", "mts", "jsx", "tsx", "vue", "svelte", "astro", "md",
];

fn is_markup_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| MARKUP_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()))
}

/// Markup files under `root` that pass the include/exclude filter, sorted by path.
pub fn markup_files(root: &Path, settings: &Settings) -> Vec<PathBuf> {
    let filter = settings.document_filter();

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .map(|name| name.starts_with('.') || name == "node_modules")
                    .unwrap_or(false)
        })
        .flatten()
        .filter(|entry| entry.file_type().is_file() && is_markup_file(entry.path()))
        .filter(|entry| {
            let relative = pathdiff::diff_paths(entry.path(), root).unwrap_or_else(|| entry.path().to_path_buf());
            filter.is_match(relative)
        })
        .map(|entry| entry.into_path())
        .collect();

    paths.sort();
    paths
}

/// Validates every markup file under `root` against one snapshot.
///
/// Unreadable files are skipped. Results are sorted by path and include files with no
/// diagnostics.
pub fn validate_workspace(
    root: &Path,
    snapshot: &ProjectSnapshot,
    settings: &Settings,
    parser: &dyn MarkupParser,
) -> Vec<(PathBuf, Vec<Diagnostic>)> {
    let paths = markup_files(root, settings);
    tracing::debug!(root = %root.display(), files = paths.len(), "validating workspace");

    paths
        .into_par_iter()
        .filter_map(|path| match std::fs::read_to_string(&path) {
            Ok(text) => {
                let diagnostics = validate_text(snapshot.registry(), settings, &text, parser);
                Some((path, diagnostics))
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "skipping unreadable file");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        markup::TagScanner,
        test_utils::{create_test_project_dir, fixture_registry},
    };
    use std::fs;

    fn write(root: &Path, relative: &str, text: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_walk_skips_hidden_and_dependencies() {
        let (_temp_dir, root) = create_test_project_dir();
        write(&root, "index.html", "");
        write(&root, "src/app.ts", "");
        write(&root, "src/readme.txt", "");
        write(&root, ".cache/page.html", "");
        write(&root, "node_modules/lib/index.js", "");

        let files = markup_files(&root, &Settings::default());
        assert_eq!(files, vec![root.join("index.html"), root.join("src/app.ts")]);
    }

    #[test]
    fn test_validate_workspace_sorted_and_filtered() {
        let (_temp_dir, root) = create_test_project_dir();
        write(&root, "b.html", "<x-nope></x-nope>");
        write(&root, "a.html", r#"<x-button size="big"></x-button>"#);
        write(&root, "legacy/old.html", "<x-nope></x-nope>");

        let settings = Settings {
            exclude: vec!["legacy/**".into()],
            ..Settings::default()
        };
        let snapshot = ProjectSnapshot::new(fixture_registry(), 1);
        let results = validate_workspace(&root, &snapshot, &settings, &TagScanner);

        let paths: Vec<_> = results.iter().map(|(path, _)| path.clone()).collect();
        assert_eq!(paths, vec![root.join("a.html"), root.join("b.html")]);
        assert_eq!(results[0].1.len(), 1);
        assert_eq!(results[1].1.len(), 1);
    }
}
