//! Arena-backed three-level service catalog.
//!
//! The tree is assembled once per edit session from flat storage records.
//! Nodes are addressed by their kind-qualified id; parent and children links
//! are resolved up front so every query is a lookup plus an iterative walk.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use servora_core::{AppError, AppResult};
use servora_domain::{NodeId, NodeKind, ServiceRecord};
use tracing::warn;

#[cfg(test)]
mod tests;

/// One resolved catalog node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    record: ServiceRecord,
    children: Vec<NodeId>,
}

impl TreeNode {
    /// Returns the kind-qualified node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.record.id()
    }

    /// Returns the node level.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.record.id().kind()
    }

    /// Returns the parent id, `None` for top-level services.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.record.parent()
    }

    /// Returns child ids ordered by position, then id.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        self.children.as_slice()
    }

    /// Returns whether the node has children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.record.name().as_str()
    }

    /// Returns the ordering value among siblings.
    #[must_use]
    pub fn position(&self) -> i32 {
        self.record.position()
    }
}

/// Non-fatal problem found while assembling the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralWarning {
    /// Record that was dropped.
    pub node: NodeId,
    /// Parent the record referenced but which is not part of the tree.
    pub missing_parent: NodeId,
}

impl Display for StructuralWarning {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "dropped orphan '{}': parent '{}' does not exist",
            self.node, self.missing_parent
        )
    }
}

/// Tree together with the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct ServiceTreeBuild {
    /// Assembled tree without orphaned records.
    pub tree: ServiceTree,
    /// Orphans that were dropped.
    pub warnings: Vec<StructuralWarning>,
}

/// Read-only service catalog indexed by node id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceTree {
    nodes: Vec<TreeNode>,
    index: HashMap<NodeId, usize>,
    roots: Vec<NodeId>,
}

impl ServiceTree {
    /// Assembles the tree from flat records of all three levels.
    ///
    /// Records whose parent is missing are dropped along with everything
    /// below them and reported as warnings. Duplicate ids are rejected.
    pub fn build(records: Vec<ServiceRecord>) -> AppResult<ServiceTreeBuild> {
        let mut records = records;
        records.sort_by(|left, right| {
            left.id()
                .kind()
                .depth()
                .cmp(&right.id().kind().depth())
                .then_with(|| left.position().cmp(&right.position()))
                .then_with(|| left.id().cmp(&right.id()))
        });

        let mut tree = Self::default();
        let mut warnings = Vec::new();

        for record in records {
            let node_id = record.id();
            if tree.index.contains_key(&node_id) {
                return Err(AppError::Validation(format!(
                    "duplicate service catalog node '{node_id}'"
                )));
            }

            match record.parent() {
                None => tree.roots.push(node_id),
                Some(parent_id) => match tree.index.get(&parent_id).copied() {
                    Some(parent_index) => tree.nodes[parent_index].children.push(node_id),
                    None => {
                        let warning = StructuralWarning {
                            node: node_id,
                            missing_parent: parent_id,
                        };
                        warn!(node = %node_id, parent = %parent_id, "dropping orphaned service record");
                        warnings.push(warning);
                        continue;
                    }
                },
            }

            tree.index.insert(node_id, tree.nodes.len());
            tree.nodes.push(TreeNode {
                record,
                children: Vec::new(),
            });
        }

        Ok(ServiceTreeBuild { tree, warnings })
    }

    /// Returns the node for an id.
    #[must_use]
    pub fn lookup(&self, id: NodeId) -> Option<&TreeNode> {
        self.index.get(&id).map(|position| &self.nodes[*position])
    }

    /// Returns the node for an id or a not-found error.
    pub fn require(&self, id: NodeId) -> AppResult<&TreeNode> {
        self.lookup(id).ok_or_else(|| {
            AppError::NotFound(format!("service catalog node '{id}' does not exist"))
        })
    }

    /// Returns whether the id is part of the tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Returns top-level services in display order.
    #[must_use]
    pub fn roots(&self) -> Vec<&TreeNode> {
        self.resolve_all(&self.roots)
    }

    /// Returns direct children, empty when the id is unknown or a leaf.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<&TreeNode> {
        self.lookup(id)
            .map(|node| self.resolve_all(node.children()))
            .unwrap_or_default()
    }

    /// Returns ancestors ordered from the immediate parent up to the root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<&TreeNode> {
        let mut ancestors = Vec::new();
        let mut current = self.lookup(id).and_then(TreeNode::parent);
        while let Some(parent_id) = current {
            let Some(parent) = self.lookup(parent_id) else {
                break;
            };
            ancestors.push(parent);
            current = parent.parent();
        }

        ancestors
    }

    /// Returns the full subtree below the node in depth-first pre-order.
    ///
    /// The node itself is not included.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<&TreeNode> {
        let Some(node) = self.lookup(id) else {
            return Vec::new();
        };

        let mut descendants = Vec::new();
        let mut stack = node.children().iter().rev().copied().collect::<Vec<_>>();
        while let Some(next_id) = stack.pop() {
            let Some(next) = self.lookup(next_id) else {
                continue;
            };
            stack.extend(next.children().iter().rev().copied());
            descendants.push(next);
        }

        descendants
    }

    /// Returns every node in depth-first pre-order starting from the roots.
    #[must_use]
    pub fn pre_order(&self) -> Vec<&TreeNode> {
        let mut ordered = Vec::with_capacity(self.nodes.len());
        for root in self.roots() {
            ordered.push(root);
            ordered.extend(self.descendants(root.id()));
        }

        ordered
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn resolve_all(&self, ids: &[NodeId]) -> Vec<&TreeNode> {
        ids.iter().filter_map(|id| self.lookup(*id)).collect()
    }
}
