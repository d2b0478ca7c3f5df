//! Bulk operations scoped to the current breadcrumb view.

use servora_core::AppResult;
use servora_domain::NodeId;

use crate::{PermissionState, ServiceTree};

mod navigation;

#[cfg(test)]
mod tests;

pub use navigation::NavigationPath;

/// Which nodes a bulk operation reaches from the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopePolicy {
    /// Only the nodes directly listed in the view.
    Row,
    /// The listed nodes and their complete subtrees.
    Subtree,
}

/// Bulk command available over the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkCommand {
    /// Grant every node in scope.
    SelectAll,
    /// Deny every node in scope.
    DeselectAll,
    /// Restore every node in scope to the last saved state.
    Reset,
}

impl BulkCommand {
    /// Returns a stable command name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectAll => "select_all",
            Self::DeselectAll => "deselect_all",
            Self::Reset => "reset",
        }
    }
}

/// Bulk command resolved against a view, awaiting the caller's decision.
///
/// Dropping it cancels the operation; nothing is applied until it is
/// executed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending bulk action does nothing until it is executed"]
pub struct PendingBulkAction {
    command: BulkCommand,
    targets: Vec<NodeId>,
}

impl PendingBulkAction {
    /// Returns the command to run.
    #[must_use]
    pub fn command(&self) -> BulkCommand {
        self.command
    }

    /// Returns the node ids captured when the action was prepared.
    #[must_use]
    pub fn targets(&self) -> &[NodeId] {
        self.targets.as_slice()
    }
}

/// Applies bulk commands to the nodes in scope of a navigation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopedBulkEditor {
    policy: ScopePolicy,
}

impl ScopedBulkEditor {
    /// Creates an editor with the given scope policy.
    #[must_use]
    pub fn new(policy: ScopePolicy) -> Self {
        Self { policy }
    }

    /// Returns the scope policy.
    #[must_use]
    pub fn policy(&self) -> ScopePolicy {
        self.policy
    }

    /// Returns the node ids a bulk operation on the current view reaches.
    #[must_use]
    pub fn scope(&self, tree: &ServiceTree, path: &NavigationPath) -> Vec<NodeId> {
        let visible = path.visible_nodes(tree);
        match self.policy {
            ScopePolicy::Row => visible.into_iter().map(|node| node.id()).collect(),
            ScopePolicy::Subtree => {
                let mut targets = Vec::new();
                for node in visible {
                    targets.push(node.id());
                    targets.extend(tree.descendants(node.id()).into_iter().map(|child| child.id()));
                }
                targets
            }
        }
    }

    /// Resolves a command against the current view without applying it.
    pub fn prepare(
        &self,
        tree: &ServiceTree,
        path: &NavigationPath,
        command: BulkCommand,
    ) -> PendingBulkAction {
        PendingBulkAction {
            command,
            targets: self.scope(tree, path),
        }
    }

    /// Applies a prepared action to `state`, using `snapshot` for resets.
    pub fn execute<S: PermissionState>(
        tree: &ServiceTree,
        state: &mut S,
        snapshot: &S,
        action: PendingBulkAction,
    ) -> AppResult<()> {
        match action.command {
            BulkCommand::SelectAll => toggle_all(tree, state, &action.targets, true),
            BulkCommand::DeselectAll => toggle_all(tree, state, &action.targets, false),
            BulkCommand::Reset => {
                for node in &action.targets {
                    state.restore_from(snapshot, *node);
                }
                Ok(())
            }
        }
    }

    /// Returns whether every node in scope is effectively granted.
    #[must_use]
    pub fn all_selected<S: PermissionState>(state: &S, targets: &[NodeId]) -> bool {
        targets.iter().all(|node| state.effective(*node))
    }

    /// Returns whether no node in scope is effectively granted.
    #[must_use]
    pub fn none_selected<S: PermissionState>(state: &S, targets: &[NodeId]) -> bool {
        targets.iter().all(|node| !state.effective(*node))
    }

    /// Returns whether the state restricted to scope differs from the
    /// snapshot restricted to scope.
    #[must_use]
    pub fn has_changes<S: PermissionState>(state: &S, snapshot: &S, targets: &[NodeId]) -> bool {
        targets.iter().any(|node| state.differs_from(snapshot, *node))
    }
}

fn toggle_all<S: PermissionState>(
    tree: &ServiceTree,
    state: &mut S,
    targets: &[NodeId],
    value: bool,
) -> AppResult<()> {
    let mut next = state.clone();
    for node in targets {
        next.toggle(tree, *node, value)?;
    }

    *state = next;
    Ok(())
}
