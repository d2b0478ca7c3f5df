use servora_application::ServiceAccessService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service_access_service: ServiceAccessService,
}
