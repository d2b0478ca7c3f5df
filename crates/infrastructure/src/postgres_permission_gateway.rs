use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use servora_application::{OverrideDiff, PermissionGateway};
use servora_core::{AppError, AppResult, NonEmptyString};
use servora_domain::{
    JobId, JobSummary, KindRef, NodeId, OverrideRow, ServiceRecord, UserId, UserSummary,
};

mod catalog;
mod job_permissions;
mod subjects;
mod user_exceptions;


/// PostgreSQL-backed gateway for the service catalog and subject permissions.
#[derive(Clone)]
pub struct PostgresPermissionGateway {
    pool: PgPool,
}

impl PostgresPermissionGateway {
    /// Creates a gateway with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct KindRefRow {
    service_id: Option<i64>,
    sub_service_id: Option<i64>,
    sub_sub_service_id: Option<i64>,
}

impl From<KindRefRow> for KindRef {
    fn from(value: KindRefRow) -> Self {
        Self {
            service_id: value.service_id,
            sub_service_id: value.sub_service_id,
            sub_sub_service_id: value.sub_sub_service_id,
        }
    }
}

#[async_trait]
impl PermissionGateway for PostgresPermissionGateway {
    async fn load_service_records(&self) -> AppResult<Vec<ServiceRecord>> {
        self.load_service_records_impl().await
    }

    async fn load_job_baseline(&self, job_id: JobId) -> AppResult<Vec<KindRef>> {
        self.load_job_baseline_impl(job_id).await
    }

    async fn load_user_overrides(&self, user_id: UserId) -> AppResult<Vec<OverrideRow>> {
        self.load_user_overrides_impl(user_id).await
    }

    async fn save_job_baseline(&self, job_id: JobId, rows: Vec<KindRef>) -> AppResult<()> {
        self.save_job_baseline_impl(job_id, rows).await
    }

    async fn save_user_overrides(&self, user_id: UserId, diff: OverrideDiff) -> AppResult<()> {
        self.save_user_overrides_impl(user_id, diff).await
    }

    async fn list_jobs(&self) -> AppResult<Vec<JobSummary>> {
        self.list_jobs_impl().await
    }

    async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        self.list_users_impl().await
    }

    async fn find_job(&self, job_id: JobId) -> AppResult<Option<JobSummary>> {
        self.find_job_impl(job_id).await
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserSummary>> {
        self.find_user_impl(user_id).await
    }
}

fn stored_name(value: String, context: &str) -> AppResult<NonEmptyString> {
    NonEmptyString::new(value)
        .map_err(|error| AppError::Internal(format!("invalid stored {context} name: {error}")))
}
