use serde::Serialize;
use servora_domain::{JobSummary, UserSummary};
use ts_rs::TS;

/// API representation of a job role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/job-response.ts"
)]
pub struct JobResponse {
    #[ts(type = "number")]
    pub job_id: i64,
    pub name: String,
}

/// API representation of a user and the job they inherit from.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub display_name: String,
    #[ts(type = "number | null")]
    pub job_id: Option<i64>,
}

impl From<JobSummary> for JobResponse {
    fn from(value: JobSummary) -> Self {
        Self {
            job_id: value.job_id.as_i64(),
            name: value.name.into(),
        }
    }
}

impl From<UserSummary> for UserResponse {
    fn from(value: UserSummary) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            display_name: value.display_name.into(),
            job_id: value.job_id.map(|job_id| job_id.as_i64()),
        }
    }
}
