mod conversions;
mod types;

pub use types::{
    CommitUserServiceExceptionsRequest, EffectiveServicesResponse,
    JobServicePermissionsResponse, ReplaceJobServicePermissionsRequest,
    ServiceExceptionDiffResponse, ServiceExceptionEntry, UserServiceExceptionsResponse,
};
