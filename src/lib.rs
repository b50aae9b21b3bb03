//! Critpath: task dependency and scheduling engine.
//!
//! This crate provides the core of a project-management backend: task
//! records with lifecycle and soft delete, directed precedence edges with an
//! acyclicity guarantee, task/user assignments, and on-demand schedule
//! metrics (critical path, float, workload) derived with the Critical Path
//! Method.
//!
//! # Architecture
//!
//! Critpath follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory reference
//!   adapters; a relational adapter plugs in behind the same ports)
//! - **Services**: Orchestration enforcing permissions, the status state
//!   machine, optimistic concurrency, and per-project edge serialisation
//!
//! # Modules
//!
//! - [`task`]: Task records, dependency graph, assignments, and the task
//!   service
//! - [`schedule`]: Pure scheduling functions over immutable snapshots

pub mod schedule;
pub mod task;
