use std::sync::Arc;

use servora_core::{AppError, AppResult};
use servora_domain::{BaselineSet, JobId, JobSummary, NodeId, OverrideMap, UserId, UserSummary};
use tracing::info;

use crate::permission_editor::{baseline_from_rows, overrides_from_rows};
use crate::{
    ExceptionState, OverrideDiff, PermissionGateway, ServiceTree, baseline_rows, granted_nodes,
    reconcile_overrides,
};

#[cfg(test)]
mod tests;

/// Stateless application service behind the HTTP surface.
///
/// Every call reloads the catalog, so it always reflects the stored tree.
#[derive(Clone)]
pub struct ServiceAccessService {
    gateway: Arc<dyn PermissionGateway>,
}

impl ServiceAccessService {
    /// Creates a new service from a gateway implementation.
    #[must_use]
    pub fn new(gateway: Arc<dyn PermissionGateway>) -> Self {
        Self { gateway }
    }

    /// Loads and assembles the service catalog.
    pub async fn load_tree(&self) -> AppResult<ServiceTree> {
        let build = ServiceTree::build(self.gateway.load_service_records().await?)?;
        Ok(build.tree)
    }

    /// Lists jobs available for baseline editing.
    pub async fn list_jobs(&self) -> AppResult<Vec<JobSummary>> {
        self.gateway.list_jobs().await
    }

    /// Lists users available for exception editing.
    pub async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        self.gateway.list_users().await
    }

    /// Returns the granted nodes of a job baseline.
    pub async fn job_baseline(&self, job_id: JobId) -> AppResult<BaselineSet> {
        self.require_job(job_id).await?;
        let tree = self.load_tree().await?;
        self.load_job_baseline(&tree, job_id).await
    }

    /// Replaces a job baseline with exactly `nodes`.
    ///
    /// Every node must exist in the catalog; nothing is written otherwise.
    pub async fn replace_job_baseline(
        &self,
        job_id: JobId,
        nodes: Vec<NodeId>,
    ) -> AppResult<BaselineSet> {
        self.require_job(job_id).await?;
        let tree = self.load_tree().await?;
        for node in &nodes {
            tree.require(*node)?;
        }

        let granted = BaselineSet::from_iter(nodes);
        self.gateway
            .save_job_baseline(job_id, baseline_rows(&granted))
            .await?;
        info!(job_id = %job_id, granted = granted.len(), "replaced job baseline");

        Ok(granted)
    }

    /// Returns the stored exceptions of a user.
    pub async fn user_exceptions(&self, user_id: UserId) -> AppResult<OverrideMap> {
        self.require_user(user_id).await?;
        let tree = self.load_tree().await?;
        Ok(overrides_from_rows(
            &tree,
            self.gateway.load_user_overrides(user_id).await?,
        ))
    }

    /// Stores `desired` as the user's exceptions and returns the applied delta.
    ///
    /// Entries equal to the inherited job value are dropped before diffing,
    /// and stored rows equal to it are deleted, so storage ends up holding
    /// exactly the genuine exceptions.
    pub async fn commit_user_exceptions(
        &self,
        user_id: UserId,
        desired: OverrideMap,
    ) -> AppResult<OverrideDiff> {
        let user = self.require_user(user_id).await?;
        let tree = self.load_tree().await?;
        for (node, _) in desired.iter() {
            tree.require(node)?;
        }

        let job_baseline = match user.job_id {
            Some(job_id) => self.load_job_baseline(&tree, job_id).await?,
            None => BaselineSet::new(),
        };
        let stored = overrides_from_rows(&tree, self.gateway.load_user_overrides(user_id).await?);

        let mut normalized = ExceptionState::new(job_baseline, desired);
        normalized.collapse_redundant();

        let diff =
            reconcile_overrides(&stored, normalized.overrides(), normalized.job_baseline());
        if !diff.is_empty() {
            self.gateway
                .save_user_overrides(user_id, diff.clone())
                .await?;
            info!(
                user_id = %user_id,
                inserted = diff.inserts.len(),
                deleted = diff.deletes.len(),
                "committed user exceptions"
            );
        }

        Ok(diff)
    }

    /// Resolves every node the user is effectively granted, in tree order.
    pub async fn effective_access(&self, user_id: UserId) -> AppResult<Vec<NodeId>> {
        let user = self.require_user(user_id).await?;
        let tree = self.load_tree().await?;
        let job_baseline = match user.job_id {
            Some(job_id) => self.load_job_baseline(&tree, job_id).await?,
            None => BaselineSet::new(),
        };
        let overrides =
            overrides_from_rows(&tree, self.gateway.load_user_overrides(user_id).await?);

        Ok(granted_nodes(&tree, &job_baseline, Some(&overrides)))
    }

    async fn load_job_baseline(
        &self,
        tree: &ServiceTree,
        job_id: JobId,
    ) -> AppResult<BaselineSet> {
        Ok(baseline_from_rows(
            tree,
            self.gateway.load_job_baseline(job_id).await?,
        ))
    }

    async fn require_job(&self, job_id: JobId) -> AppResult<JobSummary> {
        self.gateway
            .find_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("job '{job_id}' does not exist")))
    }

    async fn require_user(&self, user_id: UserId) -> AppResult<UserSummary> {
        self.gateway
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }
}
