use servora_application::OverrideDiff;
use servora_core::{AppError, AppResult};
use servora_domain::{NodeId, OverrideMap, OverrideRow};

use super::types::{
    CommitUserServiceExceptionsRequest, ReplaceJobServicePermissionsRequest,
    ServiceExceptionDiffResponse, ServiceExceptionEntry,
};

impl ReplaceJobServicePermissionsRequest {
    /// Parses the transport node ids.
    pub fn into_node_ids(self) -> AppResult<Vec<NodeId>> {
        self.node_ids
            .iter()
            .map(|node_id| NodeId::from_transport(node_id))
            .collect()
    }
}

impl CommitUserServiceExceptionsRequest {
    /// Parses the desired overrides; one node listed with both values is
    /// rejected.
    pub fn into_overrides(self) -> AppResult<OverrideMap> {
        let mut overrides = OverrideMap::new();
        for entry in self.exceptions {
            let node = NodeId::from_transport(entry.node_id.as_str())?;
            if overrides
                .get(node)
                .is_some_and(|existing| existing != entry.is_allowed)
            {
                return Err(AppError::Validation(format!(
                    "node '{node}' is listed as both allowed and denied"
                )));
            }

            overrides.set(node, entry.is_allowed);
        }

        Ok(overrides)
    }
}

impl From<OverrideRow> for ServiceExceptionEntry {
    fn from(value: OverrideRow) -> Self {
        Self {
            node_id: value.node.to_string(),
            is_allowed: value.is_allowed,
        }
    }
}

impl From<OverrideDiff> for ServiceExceptionDiffResponse {
    fn from(value: OverrideDiff) -> Self {
        Self {
            inserted: value.inserts.into_iter().map(Into::into).collect(),
            deleted: value.deletes.into_iter().map(Into::into).collect(),
        }
    }
}
