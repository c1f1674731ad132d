//! Deferred side-effect tasks.
//!
//! The publish path does not block on updates to *related* documents (the
//! parent's children cache, descendant slugs). Those run as tasks spawned on
//! the runtime, and unlike a plain fire-and-forget call their completion and
//! errors stay observable: every task resolves to a [`SideEffectReport`]
//! collected through the [`DeferredTasks`] handle returned with the publish
//! outcome.
//!
//! The publish transition can therefore complete while sibling and
//! descendant patches are still in flight. That window of inconsistency is
//! part of the design; callers that need a settled tree await
//! [`DeferredTasks::join_all`].

use std::fmt;
use std::future::Future;

use tokio::task::JoinHandle;

use crate::types::DocId;

/// A side effect the reconciler runs off the publish path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Ensure the child's canonical id is cached in the parent's `children`.
    ParentAdoption {
        /// Canonical id of the parent being updated.
        parent: DocId,
        /// Canonical id of the child being adopted.
        child: DocId,
    },
    /// Rewrite slugs in the subtree rooted at a direct child.
    RenamePropagation {
        /// Canonical id of the subtree root.
        root: DocId,
    },
}

impl fmt::Display for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParentAdoption { parent, child } => {
                write!(f, "adopt {child} into {parent}")
            }
            Self::RenamePropagation { root } => {
                write!(f, "propagate rename below {root}")
            }
        }
    }
}

/// Outcome of one deferred side effect.
///
/// Per-document fetch/patch failures inside a task are logged, recorded
/// here, and otherwise treated as complete; they never fail the publish.
#[derive(Debug, Clone)]
pub struct SideEffectReport {
    /// The side effect this report describes.
    pub effect: SideEffect,
    /// Number of documents patched.
    pub patched: usize,
    /// Errors encountered and skipped along the way.
    pub errors: Vec<String>,
}

impl SideEffectReport {
    /// True when the task finished without recording any error.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Handle over the deferred tasks spawned by one publish.
#[derive(Debug, Default)]
pub struct DeferredTasks {
    handles: Vec<(SideEffect, JoinHandle<SideEffectReport>)>,
}

impl DeferredTasks {
    /// An empty task set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task for `effect` on the current runtime.
    pub(crate) fn spawn<F>(&mut self, effect: SideEffect, task: F)
    where
        F: Future<Output = SideEffectReport> + Send + 'static,
    {
        self.handles.push((effect, tokio::spawn(task)));
    }

    /// Number of in-flight tasks.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True when no side effects were deferred.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// The side effects that were deferred, in spawn order.
    pub fn effects(&self) -> Vec<SideEffect> {
        self.handles.iter().map(|(e, _)| e.clone()).collect()
    }

    /// Await every task and collect its report. A panicked task yields a
    /// report carrying the join error instead of tearing down the caller.
    pub async fn join_all(self) -> Vec<SideEffectReport> {
        let mut reports = Vec::with_capacity(self.handles.len());
        for (effect, handle) in self.handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(join_err) => {
                    tracing::warn!(effect = %effect, error = %join_err, "deferred task failed to join");
                    reports.push(SideEffectReport {
                        effect,
                        patched: 0,
                        errors: vec![join_err.to_string()],
                    });
                }
            }
        }
        reports
    }
}
