use serde::Serialize;
use servora_application::{ServiceTree, TreeNode};
use ts_rs::TS;

/// One catalog node with its children in display order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/service-node-response.ts"
)]
pub struct ServiceNodeResponse {
    /// Transport id such as `ss:12`.
    pub id: String,
    pub kind: String,
    pub name: String,
    pub position: i32,
    pub children: Vec<ServiceNodeResponse>,
}

/// Whole service catalog, rooted at the top-level services.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/service-tree-response.ts"
)]
pub struct ServiceTreeResponse {
    pub services: Vec<ServiceNodeResponse>,
}

impl From<&ServiceTree> for ServiceTreeResponse {
    fn from(tree: &ServiceTree) -> Self {
        Self {
            services: tree
                .roots()
                .into_iter()
                .map(|node| node_response(tree, node))
                .collect(),
        }
    }
}

fn node_response(tree: &ServiceTree, node: &TreeNode) -> ServiceNodeResponse {
    ServiceNodeResponse {
        id: node.id().to_string(),
        kind: node.kind().as_str().to_owned(),
        name: node.name().to_owned(),
        position: node.position(),
        children: tree
            .children(node.id())
            .into_iter()
            .map(|child| node_response(tree, child))
            .collect(),
    }
}
