//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the maximum length.
    #[error("task title is {length} characters, maximum is {max}")]
    TitleTooLong {
        /// Character count of the rejected title.
        length: usize,
        /// Maximum permitted character count.
        max: usize,
    },

    /// The end date precedes the start date.
    #[error("end date {end} precedes start date {start}")]
    InvertedDates {
        /// The offending start date.
        start: NaiveDate,
        /// The offending end date.
        end: NaiveDate,
    },

    /// A dependency edge references the same task on both ends.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// A task references itself as its parent.
    #[error("task {0} cannot be its own parent")]
    SelfParent(TaskId),

    /// The allocation percentage is outside 0–100.
    #[error("allocation percentage {0} is outside 0-100")]
    InvalidAllocation(u8),

    /// The requested status change is not permitted by the transition table.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Status the task is currently in.
        from: TaskStatus,
        /// Status the caller requested.
        to: TaskStatus,
    },

    /// A held task may only resume to the status it was paused from.
    #[error("task was put on hold from {held_from}, cannot resume to {requested}")]
    HoldOriginMismatch {
        /// Status recorded when the task was put on hold.
        held_from: TaskStatus,
        /// Status the caller requested.
        requested: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing dependency types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown dependency type: {0}")]
pub struct ParseDependencyTypeError(pub String);

/// Error returned while parsing assignment roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment role: {0}")]
pub struct ParseAssignmentRoleError(pub String);
