//! Consistent input snapshot for schedule computations.

use crate::task::domain::{Task, TaskDependency, TaskId};
use std::collections::HashSet;

/// Immutable tasks-plus-edges snapshot.
///
/// Construction drops soft-deleted tasks and any edge touching a task that
/// is absent from the (filtered) task set, so downstream passes only ever
/// see edges between live tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSnapshot {
    tasks: Vec<Task>,
    edges: Vec<TaskDependency>,
}

impl ScheduleSnapshot {
    /// Builds a snapshot from a consistent read of tasks and edges.
    #[must_use]
    pub fn new(tasks: Vec<Task>, edges: Vec<TaskDependency>) -> Self {
        let tasks: Vec<Task> = tasks.into_iter().filter(|t| !t.is_deleted()).collect();
        let live: HashSet<TaskId> = tasks.iter().map(Task::id).collect();
        let edges = edges
            .into_iter()
            .filter(|e| {
                live.contains(&e.predecessor_task_id()) && live.contains(&e.successor_task_id())
            })
            .collect();
        Self { tasks, edges }
    }

    /// Returns the live tasks.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the edges between live tasks.
    #[must_use]
    pub fn edges(&self) -> &[TaskDependency] {
        &self.edges
    }

    /// Returns whether the snapshot holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
