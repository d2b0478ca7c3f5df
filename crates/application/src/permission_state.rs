//! In-memory permission state edited by the two administrative editors.
//!
//! Both editors share one contract so bulk editing and change tracking do
//! not care whether they operate on a job baseline or on user exceptions.

use servora_core::AppResult;
use servora_domain::NodeId;

use crate::ServiceTree;

mod baseline;
mod exception;


pub use baseline::BaselineState;
pub use exception::ExceptionState;

/// Editable permission state with cascade rules on mutation.
pub trait PermissionState: Clone + PartialEq + Send + Sync {
    /// Returns the effective grant for a node.
    fn effective(&self, node: NodeId) -> bool;

    /// Sets a node to `value`, applying the mode's cascade rules.
    ///
    /// Unknown nodes are rejected and leave the state untouched.
    fn toggle(&mut self, tree: &ServiceTree, node: NodeId, value: bool) -> AppResult<()>;

    /// Restores one node's stored state from a snapshot, without cascading.
    fn restore_from(&mut self, snapshot: &Self, node: NodeId);

    /// Returns whether the stored state for one node differs from a snapshot.
    fn differs_from(&self, snapshot: &Self, node: NodeId) -> bool;
}
