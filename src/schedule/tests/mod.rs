//! Unit tests for schedule computations.


use chrono::NaiveDate;
use mockable::DefaultClock;

use crate::task::domain::{
    DependencyType, NewTask, ProjectId, Task, TaskDependency, TaskDomainError, TaskId, UserId,
};

/// A convenient fixed date for schedule fixtures.
pub fn day(ordinal: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|base| base.checked_add_days(chrono::Days::new(u64::from(ordinal))))
        .expect("fixture dates should stay in range")
}

/// Builds a task whose estimated span covers `duration_days`.
pub fn dated_task(
    project_id: ProjectId,
    title: &str,
    start: NaiveDate,
    duration_days: u64,
) -> Result<Task, TaskDomainError> {
    let end = start
        .checked_add_days(chrono::Days::new(duration_days))
        .expect("fixture dates should stay in range");
    Task::new(
        NewTask::new(project_id, title).with_estimated_dates(start, end),
        UserId::new(),
        &DefaultClock,
    )
}

/// Builds an undated task.
pub fn undated_task(project_id: ProjectId, title: &str) -> Result<Task, TaskDomainError> {
    Task::new(
        NewTask::new(project_id, title),
        UserId::new(),
        &DefaultClock,
    )
}

/// Builds a raw precedence edge, bypassing the graph port.
pub fn raw_edge(
    project_id: ProjectId,
    predecessor: TaskId,
    successor: TaskId,
    dependency_type: DependencyType,
    lag_days: i32,
) -> Result<TaskDependency, TaskDomainError> {
    TaskDependency::new(
        project_id,
        predecessor,
        successor,
        dependency_type,
        lag_days,
        UserId::new(),
        &DefaultClock,
    )
}
