use servora_core::{AppError, AppResult};
use servora_domain::{NodeId, ServiceRecord};

use crate::test_fixtures::{all_catalog_nodes, catalog_records, catalog_tree};

use super::ServiceTree;

fn ids(nodes: Vec<&super::TreeNode>) -> Vec<NodeId> {
    nodes.into_iter().map(super::TreeNode::id).collect()
}

#[test]
fn build_links_children_in_position_order() -> AppResult<()> {
    let tree = catalog_tree()?;

    assert_eq!(
        ids(tree.roots()),
        vec![NodeId::service(1), NodeId::service(2)]
    );
    assert_eq!(
        ids(tree.children(NodeId::service(1))),
        vec![NodeId::sub_service(1), NodeId::sub_service(2)]
    );
    assert_eq!(
        ids(tree.children(NodeId::sub_service(1))),
        vec![NodeId::sub_sub_service(1), NodeId::sub_sub_service(2)]
    );
    assert!(tree.children(NodeId::sub_service(3)).is_empty());
    assert!(tree.children(NodeId::service(99)).is_empty());
    assert_eq!(tree.len(), 8);

    Ok(())
}

#[test]
fn ancestors_run_from_parent_to_root() -> AppResult<()> {
    let tree = catalog_tree()?;

    assert_eq!(
        ids(tree.ancestors(NodeId::sub_sub_service(3))),
        vec![NodeId::sub_service(2), NodeId::service(1)]
    );
    assert!(tree.ancestors(NodeId::service(2)).is_empty());

    Ok(())
}

#[test]
fn descendants_are_depth_first_and_stable() -> AppResult<()> {
    let tree = catalog_tree()?;

    let first = ids(tree.descendants(NodeId::service(1)));
    assert_eq!(
        first,
        vec![
            NodeId::sub_service(1),
            NodeId::sub_sub_service(1),
            NodeId::sub_sub_service(2),
            NodeId::sub_service(2),
            NodeId::sub_sub_service(3),
        ]
    );
    assert_eq!(ids(tree.descendants(NodeId::service(1))), first);
    assert!(tree.descendants(NodeId::sub_sub_service(1)).is_empty());

    Ok(())
}

#[test]
fn pre_order_visits_every_node_once() -> AppResult<()> {
    let tree = catalog_tree()?;
    assert_eq!(ids(tree.pre_order()), all_catalog_nodes());
    Ok(())
}

#[test]
fn orphans_are_dropped_with_warnings() -> AppResult<()> {
    let mut records = catalog_records()?;
    records.push(ServiceRecord::new(NodeId::sub_service(8), Some(42), "Ghost", 0)?);
    records.push(ServiceRecord::new(
        NodeId::sub_sub_service(9),
        Some(8),
        "Ghost child",
        0,
    )?);

    let build = ServiceTree::build(records)?;

    assert_eq!(build.tree.len(), 8);
    assert!(!build.tree.contains(NodeId::sub_service(8)));
    assert!(!build.tree.contains(NodeId::sub_sub_service(9)));
    assert_eq!(build.warnings.len(), 2);
    assert_eq!(build.warnings[0].missing_parent, NodeId::service(42));
    assert_eq!(build.warnings[1].node, NodeId::sub_sub_service(9));

    Ok(())
}

#[test]
fn duplicate_ids_are_rejected() -> AppResult<()> {
    let mut records = catalog_records()?;
    records.push(ServiceRecord::new(NodeId::sub_service(1), Some(2), "Copy", 3)?);

    let result = ServiceTree::build(records);
    assert!(matches!(result, Err(AppError::Validation(_))));

    Ok(())
}

#[test]
fn require_reports_unknown_nodes() -> AppResult<()> {
    let tree = catalog_tree()?;
    assert!(matches!(
        tree.require(NodeId::sub_sub_service(77)),
        Err(AppError::NotFound(_))
    ));
    assert_eq!(tree.require(NodeId::sub_service(2))?.name(), "Leave");
    Ok(())
}
