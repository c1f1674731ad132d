//! Initial-value template for new child pages.
//!
//! New pages created "under" an existing page are seeded with the parent
//! back-reference and the parent's slug as a path prefix, so the document
//! starts out in the right place in the tree before its first publish. The
//! first publish through the reconciler then appends the page's own slug
//! segment and wires up the parent's `children` cache.

use crate::slug::SlugPath;
use crate::types::{DocId, PageDocument};

/// Build a draft child page under `parent`.
///
/// The draft gets a fresh generated id, `parent` set to the parent's
/// canonical id, and the parent's slug seeded as its slug prefix. The title
/// segment is deliberately not appended here; composing the full slug is
/// the publish action's job.
pub fn child_page(schema_type: &str, parent: &PageDocument, title: impl Into<String>) -> PageDocument {
    PageDocument::new(DocId::generate().draft(), schema_type, title)
        .with_parent(parent.canonical_id())
        .with_slug(parent.slug.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_page_seeds_parent_and_slug_prefix() {
        let parent = PageDocument::new(DocId::new("docs"), "page", "Docs")
            .with_slug(SlugPath::parse("docs"));

        let child = child_page("page", &parent, "Guide");

        assert!(child.id.is_draft());
        assert_eq!(child.parent, Some(DocId::new("docs")));
        assert_eq!(child.slug, SlugPath::parse("docs"));
        assert_eq!(child.title, "Guide");
        assert!(child.children.is_empty());
    }

    #[test]
    fn test_child_page_ids_are_unique() {
        let parent = PageDocument::new(DocId::new("docs"), "page", "Docs");
        let a = child_page("page", &parent, "A");
        let b = child_page("page", &parent, "B");
        assert_ne!(a.id, b.id);
    }
}
