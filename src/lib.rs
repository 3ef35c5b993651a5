//! wcls: editor intelligence for custom elements
//!
//! This crate reads Custom Elements Manifests (from the project, its dependencies and
//! remote URLs), indexes them into an immutable registry, and answers editor requests
//! against it: tag/attribute/value/CSS completion, hover documentation, diagnostics for
//! markup, and go-to-definition into the manifest.
//!
//! # Architecture
//!
//! - [`manifest`]: discovery and loading of manifest sources
//! - [`registry`]: normalized component metadata, one snapshot per load cycle
//! - [`project`]: per-project context with coalesced, debounced reloads
//! - [`binding`]: `.prop`, `?bool`, `@event` and friends resolved against the registry
//! - [`completion`], [`diagnostics`], [`hover`], [`gotodef`]: request handlers
//! - [`config`]: settings from `~/.config/wcls/settings` and `<root>/wc.config`
//!
//! # Usage
//!
//! ```ignore
//! use wcls::{document::Document, markup::TagScanner, project::ProjectContext};
//!
//! let project = ProjectContext::open(&root).await;
//! let diagnostics = project.diagnostics(&path, &text, &TagScanner).await;
//! let completions = project.completions(&Document::new(text), position).await;
//! ```

// Manifest loading and the registry read model
pub mod manifest;
pub mod project;
pub mod registry;

// Request handlers
pub mod binding;
pub mod completion;
pub mod diagnostics;
pub mod gotodef;
pub mod hover;
pub mod workspace;

// Configuration and text utilities
pub mod config;
pub mod document;
pub mod error;
pub mod locator;
pub mod markup;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
