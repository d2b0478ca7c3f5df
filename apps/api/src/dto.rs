mod common;
mod permissions;
mod services;
mod subjects;

pub use common::HealthResponse;
pub use permissions::{
    CommitUserServiceExceptionsRequest, EffectiveServicesResponse,
    JobServicePermissionsResponse, ReplaceJobServicePermissionsRequest,
    ServiceExceptionDiffResponse, ServiceExceptionEntry, UserServiceExceptionsResponse,
};
pub use services::{ServiceNodeResponse, ServiceTreeResponse};
pub use subjects::{JobResponse, UserResponse};
