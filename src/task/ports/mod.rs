//! Port contracts for task persistence, graph maintenance, assignments,
//! and permission checks.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod authorizer;
pub mod graph;
pub mod ledger;
pub mod store;

pub use authorizer::{Authorizer, AuthorizerError, AuthorizerResult, Caller, Capability};
pub use graph::{DependencyGraph, DependencyGraphError, DependencyGraphResult};
pub use ledger::{AssignmentLedger, AssignmentLedgerError, AssignmentLedgerResult};
pub use store::{
    PageRequest, SortDirection, SortField, TaskFilter, TaskPage, TaskSort, TaskStore,
    TaskStoreError, TaskStoreResult,
};
