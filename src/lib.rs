//! # slug-reconciler
//!
//! Hierarchical slug reconciliation for parent/child page trees.
//!
//! The reconciler answers one question, once per publish of a page:
//!
//! > Given the current parent graph, what must `slug` and `children` become
//! > so the tree stays consistent?
//!
//! ## Core Contract
//!
//! 1. Given a page being published, resolve its ancestor chain and compose a
//!    slash-delimited, root-to-leaf slug
//! 2. Ensure the page's canonical id is present in its parent's `children`
//!    cache, exactly once
//! 3. When the title changed since the last publish, rewrite the slugs of
//!    every descendant reachable through the `children` lists
//! 4. Replace the page's own `children` cache when it has drifted from the
//!    actual reverse-reference set
//!
//! ## Architecture
//!
//! ```text
//! Publish(id) → AncestorResolver → SlugComposer → staged patch
//!                     ↓                               ↓
//!               DocumentStore ← ParentUpdater    apply + publish
//!                     ↑        ← RenamePropagator (deferred tasks)
//! ```
//!
//! ## Consistency Guarantees
//!
//! - Slug composition is a pure function of titles and the ancestor chain:
//!   re-running a publish with stable ancestors yields the same slug
//! - Side effects on related documents run as deferred tasks whose
//!   completion and errors are observable through [`DeferredTasks`]
//! - Missing ancestors truncate resolution silently; they never fail a
//!   publish

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod slug;
pub mod store;
pub mod tasks;
pub mod template;
pub mod reconciler;

// Re-exports
pub use types::{DocId, PageDocument, PagePatch};
pub use slug::{slugify, compose, SlugPath};
pub use store::{DocumentStore, InMemoryDocumentStore};
pub use tasks::{DeferredTasks, SideEffect, SideEffectReport};
pub use template::child_page;
pub use reconciler::{Reconciler, ReconcilerConfig, ReconcileError, PublishOutcome};

/// Reserved id prefix marking the draft form of a document.
/// Stripped to obtain the canonical id used for cross-references.
pub const DRAFT_PREFIX: &str = "drafts.";

/// Default schema type name for page documents.
pub const DEFAULT_SCHEMA_TYPE: &str = "page";
