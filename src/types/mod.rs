//! Core types for the reconciler.

pub mod document;
pub mod patch;

pub use document::{DocId, PageDocument};
pub use patch::PagePatch;
