use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::service_node::{KindRef, NodeId};

/// Nodes explicitly granted to a job role. Absence means denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineSet(HashSet<NodeId>);

impl BaselineSet {
    /// Creates an empty baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the node is granted.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains(&node)
    }

    /// Grants a node. Returns whether it was newly added.
    pub fn insert(&mut self, node: NodeId) -> bool {
        self.0.insert(node)
    }

    /// Revokes a node. Returns whether it was present.
    pub fn remove(&mut self, node: NodeId) -> bool {
        self.0.remove(&node)
    }

    /// Returns the number of granted nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether nothing is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates granted nodes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }

    /// Returns granted nodes sorted by kind and id.
    #[must_use]
    pub fn sorted(&self) -> Vec<NodeId> {
        let mut nodes = self.0.iter().copied().collect::<Vec<_>>();
        nodes.sort();
        nodes
    }
}

impl FromIterator<NodeId> for BaselineSet {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Per-user explicit deviations from the job baseline.
///
/// Absence of a node means the user inherits the job value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideMap(HashMap<NodeId, bool>);

impl OverrideMap {
    /// Creates an empty override map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the explicit value for a node, if any.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<bool> {
        self.0.get(&node).copied()
    }

    /// Stores an explicit value for a node.
    pub fn set(&mut self, node: NodeId, is_allowed: bool) {
        self.0.insert(node, is_allowed);
    }

    /// Drops the explicit value for a node, returning it.
    pub fn remove(&mut self, node: NodeId) -> Option<bool> {
        self.0.remove(&node)
    }

    /// Returns the number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the user has no exceptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, bool)> + '_ {
        self.0.iter().map(|(node, is_allowed)| (*node, *is_allowed))
    }

    /// Returns entries as rows sorted by node id.
    #[must_use]
    pub fn to_rows(&self) -> Vec<OverrideRow> {
        let mut rows = self
            .iter()
            .map(|(node, is_allowed)| OverrideRow { node, is_allowed })
            .collect::<Vec<_>>();
        rows.sort_by_key(|row| row.node);
        rows
    }
}

impl FromIterator<(NodeId, bool)> for OverrideMap {
    fn from_iter<T: IntoIterator<Item = (NodeId, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One persisted user exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverrideRow {
    /// Node the exception applies to.
    pub node: NodeId,
    /// Explicit grant (`true`) or denial (`false`).
    pub is_allowed: bool,
}

impl OverrideRow {
    /// Returns the persistence reference for this row's node.
    #[must_use]
    pub fn kind_ref(&self) -> KindRef {
        KindRef::from(self.node)
    }
}
