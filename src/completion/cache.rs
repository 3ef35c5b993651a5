use std::collections::HashMap;

use once_cell::sync::OnceCell;
use tower_lsp::lsp_types::CompletionItem;

use crate::registry::Registry;

use super::attribute::plain_attribute_items;

/// Lazily built per-tag attribute items for one registry snapshot.
///
/// Cells are created for every tag up front and filled on first access, so concurrent
/// readers never need a lock. The whole cache is dropped with its snapshot on reload.
#[derive(Debug, Default)]
pub struct CompletionCache {
    attributes: HashMap<String, OnceCell<Vec<CompletionItem>>>,
}

impl CompletionCache {
    pub fn new(registry: &Registry) -> CompletionCache {
        CompletionCache {
            attributes: registry
                .tags()
                .map(|tag| (tag.to_string(), OnceCell::new()))
                .collect(),
        }
    }

    /// Plain-form attribute items for `tag`, or `None` for tags the registry lacks.
    pub fn attribute_items(&self, registry: &Registry, tag: &str) -> Option<&[CompletionItem]> {
        let cell = self.attributes.get(tag)?;
        let component = registry.component(tag)?;
        Some(cell.get_or_init(|| plain_attribute_items(component)))
    }

    /// Number of tags whose items have been built.
    pub fn built(&self) -> usize {
        self.attributes.values().filter(|cell| cell.get().is_some()).count()
    }
}
