//! Slug derivation and the structured slug path.
//!
//! ## Slugification
//!
//! A slug segment is derived from a title as:
//!
//! ```text
//! slugify(title) = lower(join("-", words(strict(strip(ascii(title))))))
//! ```
//!
//! Where:
//! - `ascii`: NFKD decomposition, then drop every non-ASCII character
//!   (transliterates `é` → `e`, drops what has no ASCII form)
//! - `strip`: remove the reserved characters `* + ~ . ( ) ' " ! : @ ?`
//! - `strict`: remove everything that is not alphanumeric or whitespace
//! - `words`: split on whitespace runs (also trims)
//! - `lower`: ASCII lowercase
//!
//! The output alphabet is `[a-z0-9-]`, with no leading, trailing, or doubled
//! hyphens.
//!
//! ## Slug paths
//!
//! A full slug is an ordered list of segments, one per ancestor plus the
//! document itself, root-to-leaf. [`SlugPath`] keeps the segments structured
//! so that a rename is an index-addressed segment update rather than string
//! surgery on the joined form. It serializes as the slash-joined string and
//! parses leniently: empty segments (including the trailing-slash prefix
//! seeded by the creation template) are dropped.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Characters removed from titles before slugification.
const STRIPPED_CHARS: &[char] = &[
    '*', '+', '~', '.', '(', ')', '\'', '"', '!', ':', '@', '?',
];

/// Derive a slug segment from a title.
///
/// # Example
///
/// ```rust
/// use slug_reconciler::slugify;
///
/// assert_eq!(slugify("Getting Started!"), "getting-started");
/// assert_eq!(slugify("Café au Lait"), "cafe-au-lait");
/// ```
pub fn slugify(title: &str) -> String {
    let ascii: String = title.nfkd().filter(|c| c.is_ascii()).collect();

    let kept: String = ascii
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_ascii_lowercase()
}

/// Compose a full slug from a resolved ancestor path and a title.
///
/// With a non-empty ancestor path the result is `ancestors/slugify(title)`;
/// otherwise it is just the slugified title. Performs no uniqueness
/// enforcement.
pub fn compose(ancestor_path: &SlugPath, title: &str) -> SlugPath {
    ancestor_path.child(slugify(title))
}

/// A hierarchical slug as an ordered list of non-empty segments.
///
/// Root-to-leaf order: `segments[0]` belongs to the root ancestor and the
/// last segment to the document itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SlugPath {
    segments: Vec<String>,
}

impl SlugPath {
    /// Parse a slash-joined slug, dropping empty segments.
    pub fn parse(s: &str) -> Self {
        Self {
            segments: s
                .split('/')
                .filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build a path from pre-split segments, dropping empty ones.
    pub fn from_segments<I, T>(segments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|seg| !seg.is_empty())
                .collect(),
        }
    }

    /// The ordered segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// The document's own segment (the last one).
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Replace the segment at `index`. Returns `false` when the index is out
    /// of range or the replacement is empty; the path is left unchanged.
    pub fn set(&mut self, index: usize, segment: impl Into<String>) -> bool {
        let segment = segment.into();
        if segment.is_empty() {
            return false;
        }
        match self.segments.get_mut(index) {
            Some(slot) => {
                *slot = segment;
                true
            }
            None => false,
        }
    }

    /// A new path with `segment` appended. An empty segment appends nothing.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        let segment = segment.into();
        if !segment.is_empty() {
            segments.push(segment);
        }
        Self { segments }
    }

    /// True when `prefix` is a segment-wise prefix of this path.
    pub fn starts_with(&self, prefix: &SlugPath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }
}

impl fmt::Display for SlugPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl From<String> for SlugPath {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for SlugPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<SlugPath> for String {
    fn from(path: SlugPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_lowercases_and_joins() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("API Reference"), "api-reference");
    }

    #[test]
    fn test_slugify_strips_reserved_characters() {
        assert_eq!(slugify("What's New? (2024)!"), "whats-new-2024");
        assert_eq!(slugify("hello@world: a+b*c"), "helloworld-abc");
    }

    #[test]
    fn test_slugify_collapses_whitespace_and_trims() {
        assert_eq!(slugify("  Guide   -   Intro  "), "guide-intro");
        assert_eq!(slugify("\tTabs\nand newlines "), "tabs-and-newlines");
    }

    #[test]
    fn test_slugify_transliterates_to_ascii() {
        assert_eq!(slugify("Café au Lait"), "cafe-au-lait");
        assert_eq!(slugify("Über uns"), "uber-uns");
    }

    #[test]
    fn test_slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_compose_with_and_without_ancestors() {
        let root = SlugPath::default();
        assert_eq!(compose(&root, "Docs").to_string(), "docs");

        let ancestors = SlugPath::parse("docs/guide");
        assert_eq!(compose(&ancestors, "Intro").to_string(), "docs/guide/intro");
    }

    #[test]
    fn test_compose_is_stable_on_rerun() {
        let ancestors = SlugPath::parse("docs");
        let first = compose(&ancestors, "Deep Dive");
        let second = compose(&ancestors, "Deep Dive");
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        assert_eq!(SlugPath::parse("docs/guide/").len(), 2);
        assert_eq!(SlugPath::parse("//docs").to_string(), "docs");
        assert!(SlugPath::parse("").is_empty());
        assert!(SlugPath::parse("/").is_empty());
    }

    #[test]
    fn test_set_and_get_segments() {
        let mut path = SlugPath::parse("docs/guide/intro");
        assert_eq!(path.get(1), Some("guide"));
        assert!(path.set(1, "tutorial"));
        assert_eq!(path.to_string(), "docs/tutorial/intro");
        assert!(!path.set(9, "nope"));
        assert!(!path.set(0, ""));
        assert_eq!(path.to_string(), "docs/tutorial/intro");
    }

    #[test]
    fn test_starts_with() {
        let path = SlugPath::parse("docs/guide/intro");
        assert!(path.starts_with(&SlugPath::parse("docs/guide")));
        assert!(path.starts_with(&SlugPath::default()));
        assert!(!path.starts_with(&SlugPath::parse("docs/tutorial")));
        // Segment-wise, not string-prefix-wise.
        assert!(!path.starts_with(&SlugPath::parse("docs/gui")));
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let path = SlugPath::parse("docs/guide");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"docs/guide\"");
        let back: SlugPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn slug_alphabet_is_closed(title in ".{0,64}") {
                let slug = slugify(&title);
                prop_assert!(slug
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            }

            #[test]
            fn slug_has_no_edge_or_doubled_hyphens(title in ".{0,64}") {
                let slug = slugify(&title);
                prop_assert!(!slug.starts_with('-'));
                prop_assert!(!slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
            }

            #[test]
            fn composed_slug_keeps_ancestor_prefix(
                ancestors in proptest::collection::vec("[a-z0-9]{1,8}", 0..4),
                title in "[A-Za-z ]{1,24}",
            ) {
                let path = SlugPath::from_segments(ancestors);
                let composed = compose(&path, &title);
                prop_assert!(composed.starts_with(&path));
            }
        }
    }
}
