use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use servora_core::{AppError, AppResult, NonEmptyString};
use servora_domain::{
    JobId, JobSummary, KindRef, NodeId, OverrideMap, OverrideRow, ServiceRecord, UserId,
    UserSummary,
};

use crate::{OverrideDiff, PermissionGateway, ServiceTree};

/// Catalog shared by the unit tests:
///
/// ```text
/// s:1 Human Resources
///   ss:1 Payroll
///     sss:1 Payslips
///     sss:2 Tax forms
///   ss:2 Leave
///     sss:3 Requests
/// s:2 IT
///   ss:3 Hardware
/// ```
pub(crate) fn catalog_records() -> AppResult<Vec<ServiceRecord>> {
    Ok(vec![
        ServiceRecord::new(NodeId::service(1), None, "Human Resources", 0)?,
        ServiceRecord::new(NodeId::service(2), None, "IT", 1)?,
        ServiceRecord::new(NodeId::sub_service(1), Some(1), "Payroll", 0)?,
        ServiceRecord::new(NodeId::sub_service(2), Some(1), "Leave", 1)?,
        ServiceRecord::new(NodeId::sub_service(3), Some(2), "Hardware", 0)?,
        ServiceRecord::new(NodeId::sub_sub_service(1), Some(1), "Payslips", 0)?,
        ServiceRecord::new(NodeId::sub_sub_service(2), Some(1), "Tax forms", 1)?,
        ServiceRecord::new(NodeId::sub_sub_service(3), Some(2), "Requests", 0)?,
    ])
}

pub(crate) fn catalog_tree() -> AppResult<ServiceTree> {
    Ok(ServiceTree::build(catalog_records()?)?.tree)
}

pub(crate) fn all_catalog_nodes() -> Vec<NodeId> {
    vec![
        NodeId::service(1),
        NodeId::sub_service(1),
        NodeId::sub_sub_service(1),
        NodeId::sub_sub_service(2),
        NodeId::sub_service(2),
        NodeId::sub_sub_service(3),
        NodeId::service(2),
        NodeId::sub_service(3),
    ]
}

/// In-test gateway over the shared catalog with switchable failures.
pub(crate) struct FakePermissionGateway {
    records: Vec<ServiceRecord>,
    jobs: Vec<JobSummary>,
    users: Vec<UserSummary>,
    baselines: Mutex<HashMap<JobId, Vec<KindRef>>>,
    overrides: Mutex<HashMap<UserId, Vec<OverrideRow>>>,
    pub(crate) saved_baselines: Mutex<Vec<(JobId, Vec<KindRef>)>>,
    pub(crate) saved_diffs: Mutex<Vec<(UserId, OverrideDiff)>>,
    pub(crate) fail_loads: Mutex<bool>,
    pub(crate) fail_saves: Mutex<bool>,
}

impl FakePermissionGateway {
    pub(crate) fn new() -> AppResult<Self> {
        Ok(Self {
            records: catalog_records()?,
            jobs: Vec::new(),
            users: Vec::new(),
            baselines: Mutex::new(HashMap::new()),
            overrides: Mutex::new(HashMap::new()),
            saved_baselines: Mutex::new(Vec::new()),
            saved_diffs: Mutex::new(Vec::new()),
            fail_loads: Mutex::new(false),
            fail_saves: Mutex::new(false),
        })
    }

    pub(crate) fn with_job(
        mut self,
        job_id: JobId,
        name: &str,
        granted: &[NodeId],
    ) -> AppResult<Self> {
        self.jobs.push(JobSummary {
            job_id,
            name: NonEmptyString::new(name)?,
        });
        self.baselines
            .get_mut()
            .insert(job_id, granted.iter().copied().map(KindRef::from).collect());
        Ok(self)
    }

    pub(crate) fn with_raw_baseline(mut self, job_id: JobId, rows: Vec<KindRef>) -> Self {
        self.baselines.get_mut().insert(job_id, rows);
        self
    }

    pub(crate) fn with_user(
        mut self,
        user_id: UserId,
        job_id: Option<JobId>,
        overrides: &[(NodeId, bool)],
    ) -> AppResult<Self> {
        self.users.push(UserSummary {
            user_id,
            display_name: NonEmptyString::new("Dana")?,
            job_id,
        });
        self.overrides.get_mut().insert(
            user_id,
            overrides
                .iter()
                .map(|(node, is_allowed)| OverrideRow {
                    node: *node,
                    is_allowed: *is_allowed,
                })
                .collect(),
        );
        Ok(self)
    }

    pub(crate) async fn stored_overrides(&self, user_id: UserId) -> OverrideMap {
        self.overrides
            .lock()
            .await
            .get(&user_id)
            .map(|rows| rows.iter().map(|row| (row.node, row.is_allowed)).collect())
            .unwrap_or_default()
    }

    async fn check_loads(&self) -> AppResult<()> {
        if *self.fail_loads.lock().await {
            return Err(AppError::Internal("permission store unavailable".to_owned()));
        }
        Ok(())
    }

    async fn check_saves(&self) -> AppResult<()> {
        if *self.fail_saves.lock().await {
            return Err(AppError::Internal("permission store rejected the write".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionGateway for FakePermissionGateway {
    async fn load_service_records(&self) -> AppResult<Vec<ServiceRecord>> {
        self.check_loads().await?;
        Ok(self.records.clone())
    }

    async fn load_job_baseline(&self, job_id: JobId) -> AppResult<Vec<KindRef>> {
        self.check_loads().await?;
        Ok(self
            .baselines
            .lock()
            .await
            .get(&job_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn load_user_overrides(&self, user_id: UserId) -> AppResult<Vec<OverrideRow>> {
        self.check_loads().await?;
        Ok(self
            .overrides
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_job_baseline(&self, job_id: JobId, rows: Vec<KindRef>) -> AppResult<()> {
        self.check_saves().await?;
        self.baselines.lock().await.insert(job_id, rows.clone());
        self.saved_baselines.lock().await.push((job_id, rows));
        Ok(())
    }

    async fn save_user_overrides(&self, user_id: UserId, diff: OverrideDiff) -> AppResult<()> {
        self.check_saves().await?;
        let stored = self.stored_overrides(user_id).await;
        let next = diff.apply_to(&stored);
        self.overrides.lock().await.insert(user_id, next.to_rows());
        self.saved_diffs.lock().await.push((user_id, diff));
        Ok(())
    }

    async fn list_jobs(&self) -> AppResult<Vec<JobSummary>> {
        self.check_loads().await?;
        Ok(self.jobs.clone())
    }

    async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        self.check_loads().await?;
        Ok(self.users.clone())
    }

    async fn find_job(&self, job_id: JobId) -> AppResult<Option<JobSummary>> {
        self.check_loads().await?;
        Ok(self.jobs.iter().find(|job| job.job_id == job_id).cloned())
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserSummary>> {
        self.check_loads().await?;
        Ok(self
            .users
            .iter()
            .find(|user| user.user_id == user_id)
            .cloned())
    }
}
