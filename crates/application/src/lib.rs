//! Application services and ports.

#![forbid(unsafe_code)]

mod change_tracker;
mod permission_editor;
mod permission_ports;
mod permission_resolver;
mod permission_state;
mod scoped_bulk_editor;
mod service_access_service;
mod service_tree;

#[cfg(test)]
mod test_fixtures;

pub use change_tracker::{
    ChangeTracker, OverrideDiff, baseline_rows, diff_overrides, reconcile_overrides,
};
pub use permission_editor::{
    JobPermissionEditor, PendingJobSave, PendingUserSave, PermissionEditor, UserExceptionEditor,
};
pub use permission_ports::PermissionGateway;
pub use permission_resolver::{effective, granted_nodes};
pub use permission_state::{BaselineState, ExceptionState, PermissionState};
pub use scoped_bulk_editor::{
    BulkCommand, NavigationPath, PendingBulkAction, ScopePolicy, ScopedBulkEditor,
};
pub use service_access_service::ServiceAccessService;
pub use service_tree::{ServiceTree, ServiceTreeBuild, StructuralWarning, TreeNode};
