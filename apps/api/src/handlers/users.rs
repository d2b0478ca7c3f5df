use axum::Json;
use axum::extract::{Path, State};
use servora_domain::UserId;
use uuid::Uuid;

use crate::dto::{
    CommitUserServiceExceptionsRequest, EffectiveServicesResponse, ServiceExceptionDiffResponse,
    ServiceExceptionEntry, UserResponse, UserServiceExceptionsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .service_access_service
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn user_service_exceptions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserServiceExceptionsResponse>> {
    let user_id = UserId::from_uuid(user_id);
    let overrides = state
        .service_access_service
        .user_exceptions(user_id)
        .await?;

    Ok(Json(UserServiceExceptionsResponse {
        user_id: user_id.to_string(),
        exceptions: overrides
            .to_rows()
            .into_iter()
            .map(ServiceExceptionEntry::from)
            .collect(),
    }))
}

pub async fn commit_user_service_exceptions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<CommitUserServiceExceptionsRequest>,
) -> ApiResult<Json<ServiceExceptionDiffResponse>> {
    let desired = payload.into_overrides()?;
    let diff = state
        .service_access_service
        .commit_user_exceptions(UserId::from_uuid(user_id), desired)
        .await?;

    Ok(Json(ServiceExceptionDiffResponse::from(diff)))
}

pub async fn effective_services_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<EffectiveServicesResponse>> {
    let user_id = UserId::from_uuid(user_id);
    let nodes = state
        .service_access_service
        .effective_access(user_id)
        .await?;

    Ok(Json(EffectiveServicesResponse {
        user_id: user_id.to_string(),
        node_ids: nodes.into_iter().map(|node| node.to_string()).collect(),
    }))
}
