//! Domain entities and invariants for the service access catalog.

#![forbid(unsafe_code)]

mod permission_set;
mod service_node;
mod subject;

pub use permission_set::{BaselineSet, OverrideMap, OverrideRow};
pub use service_node::{KindRef, NodeId, NodeKind, ServiceRecord};
pub use subject::{JobId, JobSummary, UserId, UserSummary};
