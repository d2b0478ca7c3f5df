//! Snapshot tracking and minimal commit payloads.

use crate::PermissionState;

mod diff;


pub use diff::{OverrideDiff, baseline_rows, diff_overrides, reconcile_overrides};

/// Pairs the state under edit with the last saved snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTracker<S> {
    current: S,
    snapshot: S,
}

impl<S: PermissionState> ChangeTracker<S> {
    /// Starts tracking from a freshly loaded state.
    #[must_use]
    pub fn new(snapshot: S) -> Self {
        Self {
            current: snapshot.clone(),
            snapshot,
        }
    }

    /// Returns the state under edit.
    #[must_use]
    pub fn current(&self) -> &S {
        &self.current
    }

    pub(crate) fn current_mut(&mut self) -> &mut S {
        &mut self.current
    }

    pub(crate) fn split_mut(&mut self) -> (&mut S, &S) {
        (&mut self.current, &self.snapshot)
    }

    /// Returns the last saved state.
    #[must_use]
    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }

    /// Returns whether anything differs from the last saved state.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.current != self.snapshot
    }

    /// Drops every unsaved edit.
    pub fn discard_changes(&mut self) {
        self.current = self.snapshot.clone();
    }

    /// Records `saved` as the persisted state.
    ///
    /// The state under edit is left alone so edits made while the save was
    /// in flight stay pending.
    pub fn advance_to(&mut self, saved: S) {
        self.snapshot = saved;
    }
}
