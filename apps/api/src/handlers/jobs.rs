use axum::Json;
use axum::extract::{Path, State};
use servora_domain::{BaselineSet, JobId};

use crate::dto::{JobResponse, JobServicePermissionsResponse, ReplaceJobServicePermissionsRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_jobs_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<JobResponse>>> {
    let jobs = state
        .service_access_service
        .list_jobs()
        .await?
        .into_iter()
        .map(JobResponse::from)
        .collect();

    Ok(Json(jobs))
}

pub async fn job_service_permissions_handler(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<JobServicePermissionsResponse>> {
    let job_id = JobId::new(job_id);
    let baseline = state.service_access_service.job_baseline(job_id).await?;

    Ok(Json(permissions_response(job_id, &baseline)))
}

pub async fn replace_job_service_permissions_handler(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Json(payload): Json<ReplaceJobServicePermissionsRequest>,
) -> ApiResult<Json<JobServicePermissionsResponse>> {
    let job_id = JobId::new(job_id);
    let nodes = payload.into_node_ids()?;
    let baseline = state
        .service_access_service
        .replace_job_baseline(job_id, nodes)
        .await?;

    Ok(Json(permissions_response(job_id, &baseline)))
}

fn permissions_response(job_id: JobId, baseline: &BaselineSet) -> JobServicePermissionsResponse {
    JobServicePermissionsResponse {
        job_id: job_id.as_i64(),
        node_ids: baseline
            .sorted()
            .into_iter()
            .map(|node| node.to_string())
            .collect(),
    }
}
