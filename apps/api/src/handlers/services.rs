use axum::Json;
use axum::extract::State;

use crate::dto::ServiceTreeResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn service_tree_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ServiceTreeResponse>> {
    let tree = state.service_access_service.load_tree().await?;

    Ok(Json(ServiceTreeResponse::from(&tree)))
}
