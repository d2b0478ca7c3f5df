use servora_core::AppResult;
use servora_domain::{BaselineSet, NodeId};

use super::PermissionState;
use crate::ServiceTree;

/// Job baseline under edit.
///
/// Granting a node also grants its ancestors so the path to it stays
/// navigable. Revoking only removes the node itself; descendants keep their
/// grants even when an ancestor is revoked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineState {
    granted: BaselineSet,
}

impl BaselineState {
    /// Creates the state from a loaded baseline.
    #[must_use]
    pub fn new(granted: BaselineSet) -> Self {
        Self { granted }
    }

    /// Returns the granted node set.
    #[must_use]
    pub fn granted(&self) -> &BaselineSet {
        &self.granted
    }
}

impl PermissionState for BaselineState {
    fn effective(&self, node: NodeId) -> bool {
        crate::permission_resolver::effective(node, &self.granted, None)
    }

    fn toggle(&mut self, tree: &ServiceTree, node: NodeId, value: bool) -> AppResult<()> {
        tree.require(node)?;

        if !value {
            self.granted.remove(node);
            return Ok(());
        }

        self.granted.insert(node);
        for ancestor in tree.ancestors(node) {
            self.granted.insert(ancestor.id());
        }

        Ok(())
    }

    fn restore_from(&mut self, snapshot: &Self, node: NodeId) {
        if snapshot.granted.contains(node) {
            self.granted.insert(node);
        } else {
            self.granted.remove(node);
        }
    }

    fn differs_from(&self, snapshot: &Self, node: NodeId) -> bool {
        self.granted.contains(node) != snapshot.granted.contains(node)
    }
}
