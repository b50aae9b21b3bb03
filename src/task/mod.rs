//! Task dependency and assignment management.
//!
//! This module implements the persistent half of the engine: task records
//! with lifecycle state and soft delete, precedence edges kept acyclic per
//! project, and task/user assignments. All mutation flows through
//! [`services::TaskService`], which enforces permission checks, the status
//! state machine, optimistic concurrency, and per-project serialisation of
//! edge mutations. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
