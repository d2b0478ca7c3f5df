use servora_domain::{BaselineSet, KindRef, OverrideMap, OverrideRow};
use tracing::warn;

use crate::ServiceTree;

/// Converts stored baseline rows, dropping rows the catalog cannot place.
pub(crate) fn baseline_from_rows(tree: &ServiceTree, rows: Vec<KindRef>) -> BaselineSet {
    let mut granted = BaselineSet::new();
    for row in rows {
        match row.node_id() {
            Ok(node) if tree.contains(node) => {
                granted.insert(node);
            }
            Ok(node) => warn!(node = %node, "dropping baseline row for unknown service node"),
            Err(error) => warn!(%error, "dropping malformed baseline row"),
        }
    }

    granted
}

/// Converts stored exception rows, dropping rows for unknown nodes.
pub(crate) fn overrides_from_rows(tree: &ServiceTree, rows: Vec<OverrideRow>) -> OverrideMap {
    let mut overrides = OverrideMap::new();
    for row in rows {
        if tree.contains(row.node) {
            overrides.set(row.node, row.is_allowed);
        } else {
            warn!(node = %row.node, "dropping exception row for unknown service node");
        }
    }

    overrides
}
