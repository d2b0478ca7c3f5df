//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_gateway;
mod postgres_permission_gateway;

pub use in_memory_permission_gateway::InMemoryPermissionGateway;
pub use postgres_permission_gateway::PostgresPermissionGateway;
