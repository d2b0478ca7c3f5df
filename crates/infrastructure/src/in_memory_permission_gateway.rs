use std::collections::HashMap;

use async_trait::async_trait;
use servora_application::{OverrideDiff, PermissionGateway};
use servora_core::{AppError, AppResult};
use servora_domain::{
    JobId, JobSummary, KindRef, OverrideMap, OverrideRow, ServiceRecord, UserId, UserSummary,
};
use tokio::sync::RwLock;


/// In-memory permission gateway for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryPermissionGateway {
    records: RwLock<Vec<ServiceRecord>>,
    jobs: RwLock<HashMap<JobId, JobSummary>>,
    users: RwLock<HashMap<UserId, UserSummary>>,
    baselines: RwLock<HashMap<JobId, Vec<KindRef>>>,
    overrides: RwLock<HashMap<UserId, OverrideMap>>,
}

impl InMemoryPermissionGateway {
    /// Creates an empty in-memory gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one catalog record.
    pub async fn insert_service_record(&self, record: ServiceRecord) -> AppResult<()> {
        let mut records = self.records.write().await;
        if records.iter().any(|stored| stored.id() == record.id()) {
            return Err(AppError::Conflict(format!(
                "service node '{}' already exists",
                record.id()
            )));
        }

        records.push(record);
        Ok(())
    }

    /// Adds or replaces a job.
    pub async fn insert_job(&self, job: JobSummary) {
        self.jobs.write().await.insert(job.job_id, job);
    }

    /// Adds or replaces a user.
    pub async fn insert_user(&self, user: UserSummary) -> AppResult<()> {
        if let Some(job_id) = user.job_id
            && !self.jobs.read().await.contains_key(&job_id)
        {
            return Err(AppError::NotFound(format!("job '{job_id}' does not exist")));
        }

        self.users.write().await.insert(user.user_id, user);
        Ok(())
    }
}

#[async_trait]
impl PermissionGateway for InMemoryPermissionGateway {
    async fn load_service_records(&self) -> AppResult<Vec<ServiceRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn load_job_baseline(&self, job_id: JobId) -> AppResult<Vec<KindRef>> {
        Ok(self
            .baselines
            .read()
            .await
            .get(&job_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn load_user_overrides(&self, user_id: UserId) -> AppResult<Vec<OverrideRow>> {
        Ok(self
            .overrides
            .read()
            .await
            .get(&user_id)
            .map(OverrideMap::to_rows)
            .unwrap_or_default())
    }

    async fn save_job_baseline(&self, job_id: JobId, rows: Vec<KindRef>) -> AppResult<()> {
        if !self.jobs.read().await.contains_key(&job_id) {
            return Err(AppError::NotFound(format!("job '{job_id}' does not exist")));
        }
        for row in &rows {
            row.node_id()?;
        }

        self.baselines.write().await.insert(job_id, rows);
        Ok(())
    }

    async fn save_user_overrides(&self, user_id: UserId, diff: OverrideDiff) -> AppResult<()> {
        if !self.users.read().await.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        let mut overrides = self.overrides.write().await;
        let stored = overrides.entry(user_id).or_default();
        *stored = diff.apply_to(stored);
        Ok(())
    }

    async fn list_jobs(&self) -> AppResult<Vec<JobSummary>> {
        let mut jobs = self.jobs.read().await.values().cloned().collect::<Vec<_>>();
        jobs.sort_by(|left, right| {
            left.name
                .as_str()
                .cmp(right.name.as_str())
                .then_with(|| left.job_id.cmp(&right.job_id))
        });
        Ok(jobs)
    }

    async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        let mut users = self.users.read().await.values().cloned().collect::<Vec<_>>();
        users.sort_by(|left, right| {
            left.display_name
                .as_str()
                .cmp(right.display_name.as_str())
                .then_with(|| left.user_id.as_uuid().cmp(&right.user_id.as_uuid()))
        });
        Ok(users)
    }

    async fn find_job(&self, job_id: JobId) -> AppResult<Option<JobSummary>> {
        Ok(self.jobs.read().await.get(&job_id).cloned())
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserSummary>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}
