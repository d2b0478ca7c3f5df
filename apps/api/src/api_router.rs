use axum::Router;
use axum::routing::get;
use servora_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let service_routes = Router::new()
        .route(
            "/api/services/tree",
            get(handlers::services::service_tree_handler),
        )
        .route("/api/jobs", get(handlers::jobs::list_jobs_handler))
        .route(
            "/api/jobs/{job_id}/service-permissions",
            get(handlers::jobs::job_service_permissions_handler)
                .put(handlers::jobs::replace_job_service_permissions_handler),
        )
        .route("/api/users", get(handlers::users::list_users_handler))
        .route(
            "/api/users/{user_id}/service-exceptions",
            get(handlers::users::user_service_exceptions_handler)
                .put(handlers::users::commit_user_service_exceptions_handler),
        )
        .route(
            "/api/users/{user_id}/effective-services",
            get(handlers::users::effective_services_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(service_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
