//! Port for the task/user assignment ledger.

use crate::task::domain::{AssignmentRole, TaskAssignment, TaskId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for assignment ledger operations.
pub type AssignmentLedgerResult<T> = Result<T, AssignmentLedgerError>;

/// Assignment persistence contract.
#[async_trait]
pub trait AssignmentLedger: Send + Sync {
    /// Stores a new active assignment.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentLedgerError::DuplicateActiveAssignment`] when an
    /// active assignment already exists for the same `(task, user, role)`
    /// tuple.
    async fn assign(&self, assignment: &TaskAssignment) -> AssignmentLedgerResult<()>;

    /// Ends the active assignment matching the tuple, returning the closed
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentLedgerError::NoActiveAssignment`] when nothing
    /// matching the tuple is active.
    async fn unassign(
        &self,
        task_id: TaskId,
        user_id: UserId,
        role: AssignmentRole,
        at: DateTime<Utc>,
    ) -> AssignmentLedgerResult<TaskAssignment>;

    /// Returns the active assignments on a task, oldest first.
    async fn active_for_task(&self, task_id: TaskId) -> AssignmentLedgerResult<Vec<TaskAssignment>>;

    /// Returns a user's active assignments across all tasks, oldest first.
    async fn active_for_user(&self, user_id: UserId) -> AssignmentLedgerResult<Vec<TaskAssignment>>;
}

/// Errors returned by assignment ledger implementations.
#[derive(Debug, Clone, Error)]
pub enum AssignmentLedgerError {
    /// An active assignment already exists for the tuple.
    #[error("user {user} already holds role {role} on task {task}")]
    DuplicateActiveAssignment {
        /// Task end of the rejected tuple.
        task: TaskId,
        /// User end of the rejected tuple.
        user: UserId,
        /// Role of the rejected tuple.
        role: AssignmentRole,
    },

    /// No active assignment matches the tuple.
    #[error("no active assignment for user {user} with role {role} on task {task}")]
    NoActiveAssignment {
        /// Task end of the missing tuple.
        task: TaskId,
        /// User end of the missing tuple.
        user: UserId,
        /// Role of the missing tuple.
        role: AssignmentRole,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AssignmentLedgerError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
