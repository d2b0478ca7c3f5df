//! Edit sessions backing the job permission and user exception editors.
//!
//! A session owns the catalog view, the state under edit, its snapshot and
//! the breadcrumb navigation. Subject selection and persistence live in
//! [`JobPermissionEditor`] and [`UserExceptionEditor`].

use std::fmt::Display;
use std::sync::Arc;

use servora_core::{AppError, AppResult};
use servora_domain::NodeId;
use tracing::warn;

use crate::{
    BulkCommand, ChangeTracker, NavigationPath, PendingBulkAction, PermissionState, ScopePolicy,
    ScopedBulkEditor, ServiceTree, TreeNode,
};

mod job;
mod loading;
mod user;


pub use job::{JobPermissionEditor, PendingJobSave};
pub(crate) use loading::{baseline_from_rows, overrides_from_rows};
pub use user::{PendingUserSave, UserExceptionEditor};

/// In-memory editing session for one subject.
#[derive(Debug, Clone)]
pub struct PermissionEditor<S> {
    tree: Arc<ServiceTree>,
    tracker: ChangeTracker<S>,
    navigation: NavigationPath,
    bulk: ScopedBulkEditor,
    saving: bool,
}

impl<S: PermissionState> PermissionEditor<S> {
    /// Starts a session over a freshly loaded state.
    #[must_use]
    pub fn new(tree: Arc<ServiceTree>, loaded: S, policy: ScopePolicy) -> Self {
        Self {
            tree,
            tracker: ChangeTracker::new(loaded),
            navigation: NavigationPath::new(),
            bulk: ScopedBulkEditor::new(policy),
            saving: false,
        }
    }

    /// Returns the catalog being edited.
    #[must_use]
    pub fn tree(&self) -> &ServiceTree {
        &self.tree
    }

    /// Returns the state under edit.
    #[must_use]
    pub fn current(&self) -> &S {
        self.tracker.current()
    }

    /// Returns the last saved state.
    #[must_use]
    pub fn snapshot(&self) -> &S {
        self.tracker.snapshot()
    }

    /// Returns the breadcrumb trail.
    #[must_use]
    pub fn navigation(&self) -> &NavigationPath {
        &self.navigation
    }

    /// Returns how far bulk operations reach.
    #[must_use]
    pub fn policy(&self) -> ScopePolicy {
        self.bulk.policy()
    }

    /// Returns whether a save is awaiting completion.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Opens a node listed in the current view.
    pub fn descend(&mut self, node: NodeId) -> AppResult<()> {
        self.navigation.descend(&self.tree, node)
    }

    /// Leaves the current node.
    pub fn ascend(&mut self) -> Option<NodeId> {
        self.navigation.ascend()
    }

    /// Jumps to a breadcrumb depth.
    pub fn truncate(&mut self, depth: usize) {
        self.navigation.truncate(depth);
    }

    /// Returns to the catalog roots.
    pub fn reset_navigation(&mut self) {
        self.navigation.reset();
    }

    /// Returns the nodes listed in the current view.
    #[must_use]
    pub fn visible_nodes(&self) -> Vec<&TreeNode> {
        self.navigation.visible_nodes(&self.tree)
    }

    /// Returns the nodes a bulk operation on the current view reaches.
    #[must_use]
    pub fn visible_scope(&self) -> Vec<NodeId> {
        self.bulk.scope(&self.tree, &self.navigation)
    }

    /// Returns the effective grant for a node in the state under edit.
    #[must_use]
    pub fn effective(&self, node: NodeId) -> bool {
        self.tracker.current().effective(node)
    }

    /// Sets one node, cascading according to the editor mode.
    pub fn toggle(&mut self, node: NodeId, value: bool) -> AppResult<()> {
        self.tracker.current_mut().toggle(&self.tree, node, value)
    }

    /// Resolves a bulk command against the current view.
    pub fn prepare_bulk(&self, command: BulkCommand) -> PendingBulkAction {
        self.bulk.prepare(&self.tree, &self.navigation, command)
    }

    /// Applies a previously prepared bulk command.
    pub fn execute_bulk(&mut self, action: PendingBulkAction) -> AppResult<()> {
        let (current, snapshot) = self.tracker.split_mut();
        ScopedBulkEditor::execute(&self.tree, current, snapshot, action)
    }

    /// Returns whether every node in the current scope is granted.
    #[must_use]
    pub fn all_visible_selected(&self) -> bool {
        ScopedBulkEditor::all_selected(self.tracker.current(), &self.visible_scope())
    }

    /// Returns whether no node in the current scope is granted.
    #[must_use]
    pub fn none_visible_selected(&self) -> bool {
        ScopedBulkEditor::none_selected(self.tracker.current(), &self.visible_scope())
    }

    /// Returns whether the current scope has unsaved edits.
    #[must_use]
    pub fn has_visible_changes(&self) -> bool {
        ScopedBulkEditor::has_changes(
            self.tracker.current(),
            self.tracker.snapshot(),
            &self.visible_scope(),
        )
    }

    /// Returns whether the session has unsaved edits anywhere.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.tracker.has_changes()
    }

    /// Restores the last saved state everywhere.
    pub fn discard_changes(&mut self) {
        self.tracker.discard_changes();
    }

    fn begin_save(&mut self) -> AppResult<S> {
        if self.saving {
            return Err(AppError::Conflict(
                "a save is already in progress for this subject".to_owned(),
            ));
        }

        self.saving = true;
        Ok(self.tracker.current().clone())
    }

    fn finish_save(&mut self, saved: S, result: AppResult<()>) -> AppResult<()> {
        self.saving = false;
        result?;
        self.tracker.advance_to(saved);
        Ok(())
    }

    /// Settles a finished save against the session it was prepared in.
    ///
    /// `editor` is `None` once that session has been replaced; the gateway
    /// result is then only reported. Returns whether the snapshot advanced.
    fn settle_save(
        editor: Option<&mut Self>,
        saved: S,
        result: AppResult<()>,
        kind: &str,
        subject: impl Display,
    ) -> AppResult<bool> {
        match editor {
            Some(editor) => {
                editor.finish_save(saved, result)?;
                Ok(true)
            }
            None => {
                warn!(subject = %subject, "{kind} save finished after the selection changed");
                result.map(|()| false)
            }
        }
    }
}

fn no_subject_selected(kind: &str) -> AppError {
    AppError::Conflict(format!("no {kind} is selected for editing"))
}
