//! Precedence edges between tasks.

use super::{DependencyId, ParseDependencyTypeError, ProjectId, TaskDomainError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precedence relationship kind, in standard CPM terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Successor starts after the predecessor finishes.
    FinishToStart,
    /// Successor starts after the predecessor starts.
    StartToStart,
    /// Successor finishes after the predecessor finishes.
    FinishToFinish,
    /// Successor finishes after the predecessor starts.
    StartToFinish,
}

impl DependencyType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FinishToStart => "finish_to_start",
            Self::StartToStart => "start_to_start",
            Self::FinishToFinish => "finish_to_finish",
            Self::StartToFinish => "start_to_finish",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DependencyType {
    type Error = ParseDependencyTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "finish_to_start" => Ok(Self::FinishToStart),
            "start_to_start" => Ok(Self::StartToStart),
            "finish_to_finish" => Ok(Self::FinishToFinish),
            "start_to_finish" => Ok(Self::StartToFinish),
            _ => Err(ParseDependencyTypeError(value.to_owned())),
        }
    }
}

/// Directed precedence edge between two tasks in the same project.
///
/// Acyclicity of the per-project edge set is enforced by the dependency
/// graph port at insertion time, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    id: DependencyId,
    project_id: ProjectId,
    predecessor_task_id: TaskId,
    successor_task_id: TaskId,
    dependency_type: DependencyType,
    lag_days: i32,
    created_at: DateTime<Utc>,
    created_by: UserId,
}

impl TaskDependency {
    /// Creates a new edge.
    ///
    /// `lag_days` may be negative to express lead time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfDependency`] when both ends reference
    /// the same task.
    pub fn new(
        project_id: ProjectId,
        predecessor_task_id: TaskId,
        successor_task_id: TaskId,
        dependency_type: DependencyType,
        lag_days: i32,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        if predecessor_task_id == successor_task_id {
            return Err(TaskDomainError::SelfDependency(predecessor_task_id));
        }
        Ok(Self {
            id: DependencyId::new(),
            project_id,
            predecessor_task_id,
            successor_task_id,
            dependency_type,
            lag_days,
            created_at: clock.utc(),
            created_by,
        })
    }

    /// Returns the edge identifier.
    #[must_use]
    pub const fn id(&self) -> DependencyId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the predecessor task.
    #[must_use]
    pub const fn predecessor_task_id(&self) -> TaskId {
        self.predecessor_task_id
    }

    /// Returns the successor task.
    #[must_use]
    pub const fn successor_task_id(&self) -> TaskId {
        self.successor_task_id
    }

    /// Returns the relationship kind.
    #[must_use]
    pub const fn dependency_type(&self) -> DependencyType {
        self.dependency_type
    }

    /// Returns the lag in days (negative for lead time).
    #[must_use]
    pub const fn lag_days(&self) -> i32 {
        self.lag_days
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the creating principal.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }
}
