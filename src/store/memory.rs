//! In-memory document store.
//!
//! Backs the test suite and any embedding that does not bring its own
//! repository. Drafts and published documents live side by side in one map
//! keyed by full id, so draft-prefixed lookups behave exactly like the
//! external platform's.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::types::{DocId, PageDocument, PagePatch};

use super::DocumentStore;

/// Error type for the in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Patch target does not exist.
    #[error("document not found: {0}")]
    NotFound(DocId),
}

/// In-memory document store.
///
/// Uses a `BTreeMap` for deterministic iteration order and an `RwLock` so
/// the reconciler's deferred tasks can write through a shared handle.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    docs: RwLock<BTreeMap<DocId, PageDocument>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document, keyed by its full id.
    pub fn upsert(&self, doc: PageDocument) {
        self.docs.write().insert(doc.id.clone(), doc);
    }

    /// Snapshot a document by exact id.
    pub fn page(&self, id: &DocId) -> Option<PageDocument> {
        self.docs.read().get(id).cloned()
    }

    /// Number of stored documents (drafts and published counted separately).
    pub fn num_pages(&self) -> usize {
        self.docs.read().len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    type Error = InMemoryError;

    async fn get_page(&self, id: &DocId) -> Result<Option<PageDocument>, Self::Error> {
        Ok(self.docs.read().get(id).cloned())
    }

    async fn get_children_of(
        &self,
        schema_type: &str,
        parent_id: &DocId,
    ) -> Result<Vec<PageDocument>, Self::Error> {
        let parent_id = parent_id.canonical();
        Ok(self
            .docs
            .read()
            .values()
            .filter(|doc| doc.doc_type == schema_type)
            .filter(|doc| doc.parent.as_ref() == Some(&parent_id))
            .cloned()
            .collect())
    }

    async fn patch(&self, id: &DocId, patch: PagePatch) -> Result<(), Self::Error> {
        let mut docs = self.docs.write();
        let doc = docs
            .get_mut(id)
            .ok_or_else(|| InMemoryError::NotFound(id.clone()))?;
        if let Some(slug) = patch.slug {
            doc.slug = slug;
        }
        if let Some(children) = patch.children {
            doc.children = children;
        }
        doc.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn publish(&self, id: &DocId) -> Result<(), Self::Error> {
        let canonical = id.canonical();
        let draft_id = canonical.draft();
        let mut docs = self.docs.write();
        if let Some(mut doc) = docs.remove(&draft_id) {
            doc.id = canonical.clone();
            doc.updated_at = Some(Utc::now());
            docs.insert(canonical, doc);
        }
        Ok(())
    }
}
