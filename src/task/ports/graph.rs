//! Port for the per-project dependency graph.

use crate::task::domain::{DependencyId, ProjectId, TaskDependency, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for dependency graph operations.
pub type DependencyGraphResult<T> = Result<T, DependencyGraphError>;

/// Precedence edge maintenance with a per-project acyclicity guarantee.
///
/// Implementations re-verify acyclicity against the fresh edge set on every
/// insertion rather than maintaining an incremental topological index. The
/// read-then-write window of that check is raced by concurrent insertions;
/// callers must serialise edge mutations per project (the task service does
/// this with a project-keyed lock).
#[async_trait]
pub trait DependencyGraph: Send + Sync {
    /// Inserts an edge after checking it keeps the project's graph acyclic.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::DuplicateDependency`] when the same
    /// ordered pair already exists and
    /// [`DependencyGraphError::CircularDependency`] when a path from the
    /// successor back to the predecessor already exists.
    async fn add_edge(&self, dependency: &TaskDependency) -> DependencyGraphResult<()>;

    /// Fetches an edge by identifier.
    async fn get_edge(&self, id: DependencyId) -> DependencyGraphResult<Option<TaskDependency>>;

    /// Removes an edge. Removing a missing edge is a no-op.
    async fn remove_edge(&self, id: DependencyId) -> DependencyGraphResult<()>;

    /// Removes every edge whose predecessor is the given task, returning
    /// the removed edges. Used by cascading task deletion.
    async fn remove_edges_from(
        &self,
        predecessor_task_id: TaskId,
    ) -> DependencyGraphResult<Vec<TaskDependency>>;

    /// Returns a snapshot of the project's edges in insertion order.
    async fn edges_for_project(
        &self,
        project_id: ProjectId,
    ) -> DependencyGraphResult<Vec<TaskDependency>>;

    /// Returns the tasks the given task directly depends on.
    async fn predecessors_of(&self, task_id: TaskId) -> DependencyGraphResult<Vec<TaskId>>;

    /// Returns the tasks directly depending on the given task.
    async fn successors_of(&self, task_id: TaskId) -> DependencyGraphResult<Vec<TaskId>>;
}

/// Errors returned by dependency graph implementations.
#[derive(Debug, Clone, Error)]
pub enum DependencyGraphError {
    /// The same ordered predecessor/successor pair already exists.
    #[error("dependency from {predecessor} to {successor} already exists")]
    DuplicateDependency {
        /// Predecessor end of the rejected edge.
        predecessor: TaskId,
        /// Successor end of the rejected edge.
        successor: TaskId,
    },

    /// Inserting the edge would close a cycle.
    #[error("dependency from {predecessor} to {successor} would create a cycle")]
    CircularDependency {
        /// Predecessor end of the rejected edge.
        predecessor: TaskId,
        /// Successor end of the rejected edge.
        successor: TaskId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DependencyGraphError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
