use servora_core::{AppError, AppResult};
use servora_domain::NodeId;

use crate::{ServiceTree, TreeNode};

/// Breadcrumb descent into the catalog.
///
/// An empty path shows the top-level services; otherwise the view lists the
/// children of the last node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationPath(Vec<NodeId>);

impl NavigationPath {
    /// Creates a path positioned at the catalog roots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the breadcrumb trail from the outermost node inwards.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        self.0.as_slice()
    }

    /// Returns the node whose children form the current view.
    #[must_use]
    pub fn terminal(&self) -> Option<NodeId> {
        self.0.last().copied()
    }

    /// Returns the number of breadcrumb entries.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Returns the nodes listed in the current view.
    #[must_use]
    pub fn visible_nodes<'tree>(&self, tree: &'tree ServiceTree) -> Vec<&'tree TreeNode> {
        match self.terminal() {
            Some(terminal) => tree.children(terminal),
            None => tree.roots(),
        }
    }

    /// Descends into a node listed in the current view.
    ///
    /// Leaves cannot be opened since their view would be empty.
    pub fn descend(&mut self, tree: &ServiceTree, node: NodeId) -> AppResult<()> {
        let target = self
            .visible_nodes(tree)
            .into_iter()
            .find(|candidate| candidate.id() == node)
            .ok_or_else(|| {
                AppError::Validation(format!("node '{node}' is not listed in the current view"))
            })?;

        if !target.has_children() {
            return Err(AppError::Validation(format!(
                "node '{node}' has no children to navigate into"
            )));
        }

        self.0.push(node);
        Ok(())
    }

    /// Leaves the current node, returning it.
    pub fn ascend(&mut self) -> Option<NodeId> {
        self.0.pop()
    }

    /// Jumps back to a breadcrumb depth; `0` returns to the roots.
    pub fn truncate(&mut self, depth: usize) {
        self.0.truncate(depth);
    }

    /// Returns to the catalog roots.
    pub fn reset(&mut self) {
        self.0.clear();
    }
}
