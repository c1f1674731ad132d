//! Partial document updates.

use serde::{Deserialize, Serialize};

use crate::slug::SlugPath;
use crate::types::DocId;

/// A staged partial update for a single document.
///
/// Only the fields the reconciler ever rewrites are patchable: the slug and
/// the whole-list `children` cache. `children` is a full replacement, not a
/// merge; under concurrent publishes the last writer wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagePatch {
    /// Replacement slug, if staged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<SlugPath>,
    /// Replacement children list, if staged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DocId>>,
}

impl PagePatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a slug replacement.
    pub fn set_slug(mut self, slug: SlugPath) -> Self {
        self.slug = Some(slug);
        self
    }

    /// Stage a whole-list children replacement.
    pub fn set_children(mut self, children: Vec<DocId>) -> Self {
        self.children = Some(children);
        self
    }

    /// True when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.slug.is_none() && self.children.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch() {
        assert!(PagePatch::new().is_empty());
        assert!(!PagePatch::new().set_slug(SlugPath::parse("docs")).is_empty());
    }

    #[test]
    fn test_patch_accumulates_fields() {
        let patch = PagePatch::new()
            .set_slug(SlugPath::parse("docs/guide"))
            .set_children(vec![DocId::new("a"), DocId::new("b")]);
        assert_eq!(patch.slug.unwrap().to_string(), "docs/guide");
        assert_eq!(patch.children.unwrap().len(), 2);
    }
}
