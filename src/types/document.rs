//! Page document model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slug::SlugPath;
use crate::DRAFT_PREFIX;

/// Opaque document identifier.
///
/// Draft and published forms of a document share a canonical id; the draft
/// form carries the reserved [`DRAFT_PREFIX`]. Cross-references (`parent`,
/// `children`) always hold canonical ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Create an id from a raw string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random canonical id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// True when this id addresses the draft form.
    pub fn is_draft(&self) -> bool {
        self.0.starts_with(DRAFT_PREFIX)
    }

    /// The canonical id, with any draft prefix stripped.
    pub fn canonical(&self) -> DocId {
        match self.0.strip_prefix(DRAFT_PREFIX) {
            Some(stripped) => DocId(stripped.to_string()),
            None => self.clone(),
        }
    }

    /// The draft id for this document (prefix added if absent).
    pub fn draft(&self) -> DocId {
        if self.is_draft() {
            self.clone()
        } else {
            DocId(format!("{DRAFT_PREFIX}{}", self.0))
        }
    }

    /// The raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty id, which only occurs in corrupted reference
    /// lists and is filtered out defensively wherever lists are rewritten.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A page document, draft or published.
///
/// `children` is a denormalized cache of the canonical ids of documents
/// whose `parent` points at this one. It is maintained incrementally on
/// publish and may lag the true reverse-reference set between publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    /// Full id, draft-prefixed for the draft form.
    pub id: DocId,
    /// Schema type name.
    pub doc_type: String,
    /// Human-readable title; source of the document's own slug segment.
    pub title: String,
    /// Weak back-reference to the parent page (canonical id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<DocId>,
    /// Cached canonical ids of child pages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocId>,
    /// Hierarchical slug, root-to-leaf.
    #[serde(default, skip_serializing_if = "SlugPath::is_empty")]
    pub slug: SlugPath,
    /// Last store write, maintained by the repository backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PageDocument {
    /// Create a page with the given id, schema type, and title.
    pub fn new(id: DocId, doc_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            doc_type: doc_type.into(),
            title: title.into(),
            parent: None,
            children: Vec::new(),
            slug: SlugPath::default(),
            updated_at: None,
        }
    }

    /// Set the parent reference (stored canonically).
    pub fn with_parent(mut self, parent: DocId) -> Self {
        self.parent = Some(parent.canonical());
        self
    }

    /// Set the slug.
    pub fn with_slug(mut self, slug: impl Into<SlugPath>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Set the children cache.
    pub fn with_children(mut self, children: Vec<DocId>) -> Self {
        self.children = children;
        self
    }

    /// The canonical id shared by the draft and published forms.
    pub fn canonical_id(&self) -> DocId {
        self.id.canonical()
    }

    /// True when this is the draft form.
    pub fn is_draft(&self) -> bool {
        self.id.is_draft()
    }
}
