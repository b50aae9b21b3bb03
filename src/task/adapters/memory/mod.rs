//! Thread-safe in-memory adapters.
//!
//! These are the reference implementations of the task ports, used directly
//! by the test suite and suitable for single-process deployments. A
//! relational adapter replaces them behind the same port traits.

mod authorizer;
mod graph;
mod ledger;
mod store;

pub use authorizer::StaticAuthorizer;
pub use graph::InMemoryDependencyGraph;
pub use ledger::InMemoryAssignmentLedger;
pub use store::InMemoryTaskStore;
