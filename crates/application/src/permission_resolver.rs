use servora_domain::{BaselineSet, NodeId, OverrideMap};

use crate::ServiceTree;

/// Resolves the effective grant for one node.
///
/// An explicit override wins; otherwise the node inherits membership in the
/// job baseline. Job subjects pass no override map.
#[must_use]
pub fn effective(node: NodeId, baseline: &BaselineSet, overrides: Option<&OverrideMap>) -> bool {
    overrides
        .and_then(|overrides| overrides.get(node))
        .unwrap_or_else(|| baseline.contains(node))
}

/// Lists every node the subject is effectively granted, in tree pre-order.
#[must_use]
pub fn granted_nodes(
    tree: &ServiceTree,
    baseline: &BaselineSet,
    overrides: Option<&OverrideMap>,
) -> Vec<NodeId> {
    tree.pre_order()
        .into_iter()
        .map(|node| node.id())
        .filter(|node| effective(*node, baseline, overrides))
        .collect()
}
