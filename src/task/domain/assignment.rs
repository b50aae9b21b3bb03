//! Task/user assignment records.

use super::{AssignmentId, ParseAssignmentRoleError, TaskDomainError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a user plays on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentRole {
    /// Accountable for the task.
    Owner,
    /// Works on the task.
    Contributor,
    /// Reviews the task's output.
    Reviewer,
}

impl AssignmentRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Contributor => "contributor",
            Self::Reviewer => "reviewer",
        }
    }
}

impl fmt::Display for AssignmentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AssignmentRole {
    type Error = ParseAssignmentRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "owner" => Ok(Self::Owner),
            "contributor" => Ok(Self::Contributor),
            "reviewer" => Ok(Self::Reviewer),
            _ => Err(ParseAssignmentRoleError(value.to_owned())),
        }
    }
}

/// Validated allocation percentage in 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationPercent(u8);

impl AllocationPercent {
    /// Creates a validated allocation percentage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidAllocation`] when the value exceeds
    /// 100.
    pub const fn new(value: u8) -> Result<Self, TaskDomainError> {
        if value > 100 {
            return Err(TaskDomainError::InvalidAllocation(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying percentage.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for AllocationPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Binding of a user to a task with a role and allocation.
///
/// An assignment is active while `unassigned_at` is unset; the ledger port
/// enforces at most one active assignment per `(task, user, role)` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    id: AssignmentId,
    task_id: TaskId,
    user_id: UserId,
    role: AssignmentRole,
    allocation: AllocationPercent,
    assigned_at: DateTime<Utc>,
    unassigned_at: Option<DateTime<Utc>>,
}

impl TaskAssignment {
    /// Creates a new active assignment.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        user_id: UserId,
        role: AssignmentRole,
        allocation: AllocationPercent,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: AssignmentId::new(),
            task_id,
            user_id,
            role,
            allocation,
            assigned_at: clock.utc(),
            unassigned_at: None,
        }
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub const fn id(&self) -> AssignmentId {
        self.id
    }

    /// Returns the assigned task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the assigned user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> AssignmentRole {
        self.role
    }

    /// Returns the allocation percentage.
    #[must_use]
    pub const fn allocation(&self) -> AllocationPercent {
        self.allocation
    }

    /// Returns the assignment timestamp.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    /// Returns the unassignment timestamp, if the assignment has ended.
    #[must_use]
    pub const fn unassigned_at(&self) -> Option<DateTime<Utc>> {
        self.unassigned_at
    }

    /// Returns whether the assignment is currently active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.unassigned_at.is_none()
    }

    /// Ends the assignment at the given instant.
    pub fn close(&mut self, at: DateTime<Utc>) {
        self.unassigned_at = Some(at);
    }
}
