use async_trait::async_trait;

use servora_core::AppResult;
use servora_domain::{JobId, JobSummary, KindRef, OverrideRow, ServiceRecord, UserId, UserSummary};

use crate::OverrideDiff;

/// Persistence port for the service catalog and subject permissions.
///
/// Rows identify exactly one tree level; adapters must never populate two
/// references on one row.
#[async_trait]
pub trait PermissionGateway: Send + Sync {
    /// Loads every service, sub-service and sub-sub-service record.
    async fn load_service_records(&self) -> AppResult<Vec<ServiceRecord>>;

    /// Loads the granted rows of a job baseline.
    async fn load_job_baseline(&self, job_id: JobId) -> AppResult<Vec<KindRef>>;

    /// Loads the explicit exceptions of a user.
    async fn load_user_overrides(&self, user_id: UserId) -> AppResult<Vec<OverrideRow>>;

    /// Replaces a job baseline with `rows` atomically.
    async fn save_job_baseline(&self, job_id: JobId, rows: Vec<KindRef>) -> AppResult<()>;

    /// Applies an exception delta in one transaction, deletes first.
    async fn save_user_overrides(&self, user_id: UserId, diff: OverrideDiff) -> AppResult<()>;

    /// Lists jobs available for baseline editing.
    async fn list_jobs(&self) -> AppResult<Vec<JobSummary>>;

    /// Lists users available for exception editing.
    async fn list_users(&self) -> AppResult<Vec<UserSummary>>;

    /// Returns one job, if it exists.
    async fn find_job(&self, job_id: JobId) -> AppResult<Option<JobSummary>>;

    /// Returns one user with their assigned job.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserSummary>>;
}
