//! Port for delegated permission checks.
//!
//! The engine never resolves roles itself: it receives an authenticated
//! caller and asks an external authorizer whether that caller holds a
//! capability on a project.

use crate::task::domain::{ProjectId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for authorizer operations.
pub type AuthorizerResult<T> = Result<T, AuthorizerError>;

/// Already-authenticated caller principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller {
    user_id: UserId,
}

impl Caller {
    /// Creates a caller principal.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Returns the caller's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Capabilities the task service gates its operations on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read tasks, schedules, and workload.
    ViewTasks,
    /// Create tasks.
    CreateTask,
    /// Edit task fields and move tasks through the state machine.
    EditTask,
    /// Soft-delete tasks.
    DeleteTask,
    /// Add and remove dependency edges.
    ManageDependencies,
    /// Assign and unassign users.
    AssignUsers,
    /// Reopen completed tasks.
    ReopenTask,
}

impl Capability {
    /// Every capability, for blanket grants in tests and tooling.
    pub const ALL: [Self; 7] = [
        Self::ViewTasks,
        Self::CreateTask,
        Self::EditTask,
        Self::DeleteTask,
        Self::ManageDependencies,
        Self::AssignUsers,
        Self::ReopenTask,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewTasks => "view_tasks",
            Self::CreateTask => "create_task",
            Self::EditTask => "edit_task",
            Self::DeleteTask => "delete_task",
            Self::ManageDependencies => "manage_dependencies",
            Self::AssignUsers => "assign_users",
            Self::ReopenTask => "reopen_task",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delegated permission-check contract.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Returns whether the caller holds the capability on the project.
    async fn is_allowed(
        &self,
        caller: &Caller,
        project_id: ProjectId,
        capability: Capability,
    ) -> AuthorizerResult<bool>;
}

/// Errors returned by authorizer implementations.
#[derive(Debug, Clone, Error)]
pub enum AuthorizerError {
    /// The permission backend could not be consulted.
    #[error("authorization backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuthorizerError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
