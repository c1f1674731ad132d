//! Hierarchy and slug reconciliation.
//!
//! Runs once per publish of a page and brings `slug` and `children` back
//! into agreement with the current parent graph.
//!
//! ## Algorithm
//!
//! 1. Resolve the ancestor chain of the draft's `parent` into a root-to-leaf
//!    slug prefix
//! 2. Compose the new slug from that prefix and the draft title; stage it
//! 3. If a parent exists, defer a task that caches the page's canonical id
//!    in the parent's `children`
//! 4. Query the actual children; if the slugified title changed since the
//!    last publish, defer one rename-propagation task per child; if the
//!    queried id list differs from the draft's cached `children`, stage a
//!    wholesale replacement
//! 5. Apply the staged patch to the draft, then run the publish transition
//!
//! Deferred tasks are not awaited on the publish path; their reports are
//! collected through the [`DeferredTasks`] handle in the outcome.
//!
//! ## Degradation policy
//!
//! A missing ancestor truncates resolution as if the chain ended there. A
//! cycle in `parent` or in a `children` list truncates the walk instead of
//! looping. Fetch or patch failures inside deferred tasks are logged and
//! recorded on the task's report, never surfaced to the publish caller.

use std::collections::HashSet;
use std::sync::Arc;

use crate::slug::{compose, slugify, SlugPath};
use crate::store::DocumentStore;
use crate::tasks::{DeferredTasks, SideEffect, SideEffectReport};
use crate::types::{DocId, PagePatch};
use crate::DEFAULT_SCHEMA_TYPE;

/// Error type for reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Neither a draft nor a published form exists for the id.
    #[error("document not found: {0}")]
    NotFound(DocId),
    /// The document is not of the configured schema type.
    #[error("document {id} has type \"{actual}\", expected \"{expected}\"")]
    UnexpectedType {
        /// Canonical id of the offending document.
        id: DocId,
        /// Schema type the reconciler is configured for.
        expected: String,
        /// Schema type actually stored.
        actual: String,
    },
    /// Store error.
    #[error("store error: {0}")]
    Store(String),
}

impl ReconcileError {
    /// Create a store error from any backend error type.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::Store(e.to_string())
    }
}

/// Reconciler configuration.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Schema type of the hierarchical page documents.
    pub schema_type: String,
    /// Cap on ancestor chain length before resolution truncates.
    pub max_ancestor_depth: usize,
    /// Cap on documents visited by one rename-propagation task.
    pub max_propagation_visits: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            schema_type: DEFAULT_SCHEMA_TYPE.to_string(),
            max_ancestor_depth: 64,
            max_propagation_visits: 10_000,
        }
    }
}

/// Result of a successful publish.
#[derive(Debug)]
pub struct PublishOutcome {
    /// Canonical id of the published page.
    pub id: DocId,
    /// The slug written to the page.
    pub slug: SlugPath,
    /// The replacement `children` list, when drift was detected and staged.
    pub children: Option<Vec<DocId>>,
    /// Handle over the side-effect tasks still in flight.
    pub deferred: DeferredTasks,
}

/// Hierarchy and slug reconciler.
///
/// Holds a shared repository handle; every step reads and writes through it.
pub struct Reconciler<S: DocumentStore> {
    store: Arc<S>,
    config: ReconcilerConfig,
}

impl<S: DocumentStore + Send + Sync + 'static> Reconciler<S> {
    /// Create a reconciler over a repository handle.
    pub fn new(store: Arc<S>, config: ReconcilerConfig) -> Self {
        Self { store, config }
    }

    /// Create a reconciler with the default configuration.
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, ReconcilerConfig::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the full ancestor-path slug prefix for a parent reference.
    ///
    /// Walks canonical `parent` references upward from the immediate parent,
    /// prepending each ancestor's stored slug segments so the result is
    /// root-to-leaf. Exact repeated segments across the whole chain collapse
    /// to their first, root-most occurrence.
    ///
    /// A missing ancestor truncates resolution as if the chain ended there.
    /// Cycles and chains longer than `max_ancestor_depth` truncate the same
    /// way. No parent yields the empty path.
    pub async fn resolve_ancestor_path(
        &self,
        parent: Option<&DocId>,
    ) -> Result<SlugPath, ReconcileError> {
        let Some(parent) = parent else {
            return Ok(SlugPath::default());
        };

        let mut accumulated: Vec<String> = Vec::new();
        let mut visited: HashSet<DocId> = HashSet::new();
        let mut cursor = parent.canonical();

        loop {
            if visited.len() >= self.config.max_ancestor_depth || !visited.insert(cursor.clone()) {
                tracing::warn!(id = %cursor, "ancestor chain truncated, cycle or depth cap hit");
                break;
            }
            let ancestor = match self.store.get_page(&cursor).await {
                Ok(Some(doc)) => doc,
                Ok(None) => {
                    tracing::warn!(id = %cursor, "ancestor not found, truncating resolution");
                    break;
                }
                Err(e) => return Err(ReconcileError::from_store(e)),
            };

            let mut prefixed: Vec<String> = ancestor.slug.segments().to_vec();
            prefixed.append(&mut accumulated);
            accumulated = prefixed;

            match ancestor.parent {
                Some(next) => cursor = next.canonical(),
                None => break,
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        let deduped: Vec<String> = accumulated
            .into_iter()
            .filter(|seg| seen.insert(seg.clone()))
            .collect();
        Ok(SlugPath::from_segments(deduped))
    }

    /// Publish the page with the given id (draft-prefixed or canonical),
    /// reconciling its slug and the surrounding hierarchy.
    pub async fn publish(&self, id: &DocId) -> Result<PublishOutcome, ReconcileError> {
        let canonical = id.canonical();
        let draft_id = canonical.draft();

        let draft = self
            .store
            .get_page(&draft_id)
            .await
            .map_err(ReconcileError::from_store)?;
        let published = self
            .store
            .get_page(&canonical)
            .await
            .map_err(ReconcileError::from_store)?;
        let doc = draft
            .clone()
            .or_else(|| published.clone())
            .ok_or_else(|| ReconcileError::NotFound(canonical.clone()))?;
        if doc.doc_type != self.config.schema_type {
            return Err(ReconcileError::UnexpectedType {
                id: canonical,
                expected: self.config.schema_type.clone(),
                actual: doc.doc_type,
            });
        }

        let ancestor_path = self.resolve_ancestor_path(doc.parent.as_ref()).await?;
        let new_slug = compose(&ancestor_path, &doc.title);
        let mut staged = PagePatch::new().set_slug(new_slug.clone());

        let mut deferred = DeferredTasks::new();
        if let Some(parent_id) = doc.parent.as_ref() {
            let parent_id = parent_id.canonical();
            deferred.spawn(
                SideEffect::ParentAdoption {
                    parent: parent_id.clone(),
                    child: canonical.clone(),
                },
                Self::adopt_child(Arc::clone(&self.store), parent_id, canonical.clone()),
            );
        }

        let child_docs = self
            .store
            .get_children_of(&self.config.schema_type, &canonical)
            .await
            .map_err(ReconcileError::from_store)?;

        let mut synced_children = None;
        if !child_docs.is_empty() {
            // Canonical ids, draft/published pairs and corrupt entries collapsed,
            // store order preserved.
            let mut fresh: Vec<DocId> = Vec::with_capacity(child_docs.len());
            for child in &child_docs {
                let child_id = child.canonical_id();
                if !child_id.is_empty() && !fresh.contains(&child_id) {
                    fresh.push(child_id);
                }
            }

            // Propagate only an actual rename: a draft whose slugified title
            // differs from the previously published one.
            let new_segment = slugify(&doc.title);
            let old_segment = published.as_ref().map(|p| slugify(&p.title));
            if let Some(old_segment) = old_segment {
                if draft.is_some() && old_segment != new_segment {
                    let segment_index = new_slug.len().saturating_sub(1);
                    for root in &fresh {
                        deferred.spawn(
                            SideEffect::RenamePropagation { root: root.clone() },
                            Self::propagate_rename(
                                Arc::clone(&self.store),
                                root.clone(),
                                segment_index,
                                old_segment.clone(),
                                new_segment.clone(),
                                self.config.max_propagation_visits,
                            ),
                        );
                    }
                }
            }

            // Drift detection compares against the draft's cached list, not a
            // second repository read.
            if fresh != doc.children {
                staged = staged.set_children(fresh.clone());
                synced_children = Some(fresh);
            }
        }

        let patch_target = if draft.is_some() { draft_id } else { canonical.clone() };
        self.store
            .patch(&patch_target, staged)
            .await
            .map_err(ReconcileError::from_store)?;
        self.store
            .publish(&canonical)
            .await
            .map_err(ReconcileError::from_store)?;

        tracing::info!(
            id = %canonical,
            slug = %new_slug,
            deferred = deferred.len(),
            "page published"
        );
        Ok(PublishOutcome {
            id: canonical,
            slug: new_slug,
            children: synced_children,
            deferred,
        })
    }

    /// Ensure `child_id` is cached exactly once in the parent's `children`.
    ///
    /// Rebuilds the list with empty ids and duplicates filtered out, appends
    /// the child when absent, and patches only when the rebuilt list differs
    /// from the stored one. A missing parent is a no-op.
    async fn adopt_child(store: Arc<S>, parent_id: DocId, child_id: DocId) -> SideEffectReport {
        let effect = SideEffect::ParentAdoption {
            parent: parent_id.clone(),
            child: child_id.clone(),
        };
        let mut errors = Vec::new();
        let mut patched = 0;

        match store.get_page(&parent_id).await {
            Ok(Some(parent)) => {
                let mut rebuilt: Vec<DocId> = Vec::with_capacity(parent.children.len() + 1);
                for existing in &parent.children {
                    if !existing.is_empty() && !rebuilt.contains(existing) {
                        rebuilt.push(existing.clone());
                    }
                }
                if !rebuilt.contains(&child_id) {
                    rebuilt.push(child_id.clone());
                }
                if rebuilt == parent.children {
                    tracing::debug!(parent = %parent_id, child = %child_id, "children cache already current");
                } else {
                    match store
                        .patch(&parent.id, PagePatch::new().set_children(rebuilt))
                        .await
                    {
                        Ok(()) => patched = 1,
                        Err(e) => {
                            tracing::warn!(parent = %parent_id, error = %e, "children patch failed");
                            errors.push(e.to_string());
                        }
                    }
                }
            }
            Ok(None) => {
                tracing::debug!(parent = %parent_id, "parent not found, skipping adoption");
            }
            Err(e) => {
                tracing::warn!(parent = %parent_id, error = %e, "parent fetch failed");
                errors.push(e.to_string());
            }
        }

        SideEffectReport {
            effect,
            patched,
            errors,
        }
    }

    /// Rewrite the renamed segment throughout the subtree rooted at `root`.
    ///
    /// Iterative walk over the denormalized `children` lists with a
    /// visited-id set and a visit cap. A node whose slug does not carry
    /// `old_segment` at `segment_index` is left unchanged. Patches address
    /// canonical ids only; descendants' drafts are not touched.
    async fn propagate_rename(
        store: Arc<S>,
        root: DocId,
        segment_index: usize,
        old_segment: String,
        new_segment: String,
        max_visits: usize,
    ) -> SideEffectReport {
        let effect = SideEffect::RenamePropagation { root: root.clone() };
        let mut errors = Vec::new();
        let mut patched = 0;
        let mut visited: HashSet<DocId> = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let id = id.canonical();
            if id.is_empty() || !visited.insert(id.clone()) {
                continue;
            }
            if visited.len() > max_visits {
                tracing::warn!(limit = max_visits, "propagation visit cap hit, subtree truncated");
                errors.push(format!("visit cap of {max_visits} documents reached"));
                break;
            }

            let doc = match store.get_page(&id).await {
                Ok(Some(doc)) => doc,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "fetch failed during propagation");
                    errors.push(e.to_string());
                    continue;
                }
            };

            if doc.slug.get(segment_index) == Some(old_segment.as_str()) {
                let mut slug = doc.slug.clone();
                slug.set(segment_index, new_segment.clone());
                match store.patch(&id, PagePatch::new().set_slug(slug)).await {
                    Ok(()) => patched += 1,
                    Err(e) => {
                        tracing::warn!(id = %id, error = %e, "slug patch failed");
                        errors.push(e.to_string());
                    }
                }
            } else {
                tracing::debug!(id = %id, "renamed segment absent, slug left unchanged");
            }

            stack.extend(doc.children.iter().filter(|c| !c.is_empty()).cloned());
        }

        SideEffectReport {
            effect,
            patched,
            errors,
        }
    }
}
