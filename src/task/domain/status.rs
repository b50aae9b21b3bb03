//! Task lifecycle status, priority, and the status transition table.

use super::{ParsePriorityError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Task lifecycle status.
///
/// The declaration order doubles as the sort order used by task search.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    NotStarted,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Completed,
    /// Work is temporarily paused.
    OnHold,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "on_hold" => Ok(Self::OnHold),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task priority.
///
/// Ordered from least to most urgent; the ordering is used by task search.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default priority.
    Medium,
    /// Should be picked up soon.
    High,
    /// Needs immediate attention.
    Urgent,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Closed table of permitted status transitions.
///
/// The table is an explicit `(from, to)` set rather than scattered
/// conditionals, so deployments that permit additional transitions (such as
/// completing a task directly from `not_started`) construct their own table
/// with [`TransitionTable::new`]. `on_hold` admits both resume targets here;
/// the [`Task`](super::Task) aggregate additionally guards the resume target
/// against the status the task was paused from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    allowed: HashSet<(TaskStatus, TaskStatus)>,
}

impl TransitionTable {
    /// Builds a table from an explicit set of permitted transitions.
    #[must_use]
    pub fn new(transitions: impl IntoIterator<Item = (TaskStatus, TaskStatus)>) -> Self {
        Self {
            allowed: transitions.into_iter().collect(),
        }
    }

    /// Returns whether the table permits moving from `from` to `to`.
    #[must_use]
    pub fn allows(&self, from: TaskStatus, to: TaskStatus) -> bool {
        self.allowed.contains(&(from, to))
    }

    /// Returns whether a transition reopens a completed task.
    ///
    /// Reopening is separately permissioned by the task service.
    #[must_use]
    pub const fn is_reopen(from: TaskStatus, to: TaskStatus) -> bool {
        matches!(
            (from, to),
            (TaskStatus::Completed, TaskStatus::NotStarted)
        )
    }
}

impl Default for TransitionTable {
    /// The standard forward flow: `not_started → in_progress → completed`,
    /// `on_hold` reachable from (and returning to) `not_started` or
    /// `in_progress`, and reopen from `completed` back to `not_started`.
    fn default() -> Self {
        Self::new([
            (TaskStatus::NotStarted, TaskStatus::InProgress),
            (TaskStatus::NotStarted, TaskStatus::OnHold),
            (TaskStatus::InProgress, TaskStatus::Completed),
            (TaskStatus::InProgress, TaskStatus::OnHold),
            (TaskStatus::OnHold, TaskStatus::NotStarted),
            (TaskStatus::OnHold, TaskStatus::InProgress),
            (TaskStatus::Completed, TaskStatus::NotStarted),
        ])
    }
}
