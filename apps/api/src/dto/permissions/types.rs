use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Granted nodes of a job baseline.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/job-service-permissions-response.ts"
)]
pub struct JobServicePermissionsResponse {
    #[ts(type = "number")]
    pub job_id: i64,
    pub node_ids: Vec<String>,
}

/// Incoming payload replacing a job baseline.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/replace-job-service-permissions-request.ts"
)]
pub struct ReplaceJobServicePermissionsRequest {
    pub node_ids: Vec<String>,
}

/// One per-user override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/service-exception-entry.ts"
)]
pub struct ServiceExceptionEntry {
    pub node_id: String,
    pub is_allowed: bool,
}

/// Stored overrides of a user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-service-exceptions-response.ts"
)]
pub struct UserServiceExceptionsResponse {
    pub user_id: String,
    pub exceptions: Vec<ServiceExceptionEntry>,
}

/// Incoming payload with the desired override set of a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/commit-user-service-exceptions-request.ts"
)]
pub struct CommitUserServiceExceptionsRequest {
    pub exceptions: Vec<ServiceExceptionEntry>,
}

/// Rows written by an override commit.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/service-exception-diff-response.ts"
)]
pub struct ServiceExceptionDiffResponse {
    pub inserted: Vec<ServiceExceptionEntry>,
    pub deleted: Vec<ServiceExceptionEntry>,
}

/// Nodes a user is effectively granted.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/effective-services-response.ts"
)]
pub struct EffectiveServicesResponse {
    pub user_id: String,
    pub node_ids: Vec<String>,
}
