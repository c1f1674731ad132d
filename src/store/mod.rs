//! Document repository backends.

pub mod memory;

use async_trait::async_trait;

use crate::types::{DocId, PageDocument, PagePatch};

/// Trait for document repository backends.
///
/// The reconciler assumes read-your-writes consistency within a single
/// reconciliation run, but no cross-call transactional isolation: two
/// publishes racing against the same backend can interleave reads and
/// whole-list writes.
///
/// Ids are looked up exactly as given: a draft-prefixed id addresses the
/// draft form, a canonical id the published/current form.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Fetch a document by exact id.
    async fn get_page(&self, id: &DocId) -> Result<Option<PageDocument>, Self::Error>;

    /// Fetch every document of `schema_type` whose `parent` reference equals
    /// `parent_id` (canonical), in deterministic order.
    async fn get_children_of(
        &self,
        schema_type: &str,
        parent_id: &DocId,
    ) -> Result<Vec<PageDocument>, Self::Error>;

    /// Apply a partial update to the document at `id`.
    async fn patch(&self, id: &DocId, patch: PagePatch) -> Result<(), Self::Error>;

    /// Draft → published transition for the document with canonical id `id`.
    /// The draft's content replaces the published form and the draft is
    /// removed. No-op when no draft exists.
    async fn publish(&self, id: &DocId) -> Result<(), Self::Error>;
}

pub use memory::InMemoryDocumentStore;
