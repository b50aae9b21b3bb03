//! Repository port for task persistence, lookup, and search.

use crate::task::domain::{Priority, ProjectId, Task, TaskDomainError, TaskId, TaskStatus, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Largest page size the store will serve.
pub const MAX_PAGE_SIZE: usize = 100;

/// Task persistence contract.
///
/// The store is deliberately unaware of dependency edges and assignments;
/// cross-component rules (such as the delete gate on outgoing edges) live
/// in the task service where all ports are visible.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the task ID already
    /// exists.
    async fn create(&self, task: &Task) -> TaskStoreResult<()>;

    /// Fetches a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist or
    /// has been soft-deleted.
    async fn get(&self, id: TaskId) -> TaskStoreResult<Task>;

    /// Replaces a stored task, compare-and-swap style.
    ///
    /// The caller mutates a copy read at `expected_version` through the
    /// domain methods (which bump the version) and submits it here; the
    /// store commits only when the stored version still equals
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::VersionConflict`] on a version mismatch (a
    /// retryable condition: the caller re-reads and reapplies) and
    /// [`TaskStoreError::NotFound`] when the task is missing or
    /// soft-deleted.
    async fn update(&self, task: &Task, expected_version: u64) -> TaskStoreResult<()>;

    /// Soft-deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task is missing or
    /// already soft-deleted.
    async fn soft_delete(
        &self,
        id: TaskId,
        deleted_by: UserId,
        deleted_at: DateTime<Utc>,
    ) -> TaskStoreResult<()>;

    /// Returns the active (non-deleted) tasks of a project, ordered by id.
    async fn list_by_project(&self, project_id: ProjectId) -> TaskStoreResult<Vec<Task>>;

    /// Searches active tasks with filtering, sorting, and pagination.
    ///
    /// Sorting is stable with a deterministic ascending-id tie-break; page
    /// bounds are clamped server-side (`page >= 1`, `size` in 1–100).
    async fn search(
        &self,
        filter: &TaskFilter,
        sort: TaskSort,
        page: PageRequest,
    ) -> TaskStoreResult<TaskPage>;
}

/// Search filter; all criteria are conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Owning project. Search is always project-scoped.
    pub project_id: Option<ProjectId>,
    /// Match a single status.
    pub status: Option<TaskStatus>,
    /// Match a single priority.
    pub priority: Option<Priority>,
    /// Case-insensitive title substring.
    pub title_contains: Option<String>,
    /// Restrict to an explicit id set (the service resolves assignee
    /// filters through the ledger into this form).
    pub id_in: Option<HashSet<TaskId>>,
}

/// Sortable task fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Lexicographic title order.
    Title,
    /// Priority order, least urgent first.
    Priority,
    /// Status order, earliest lifecycle stage first.
    Status,
    /// Creation timestamp order.
    CreatedAt,
    /// Estimated start date order; undated tasks sort first.
    EstimatedStartDate,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// Requested sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    /// Field to order by.
    pub field: SortField,
    /// Direction applied to the field (the id tie-break stays ascending).
    pub direction: SortDirection,
}

impl Default for TaskSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Ascending,
        }
    }
}

/// Requested result page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number; clamped to at least 1.
    pub page: usize,
    /// Page size; clamped to 1–100.
    pub size: usize,
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// Returns the request with server-side bounds applied.
    #[must_use]
    pub const fn clamped(self) -> Self {
        Self {
            page: if self.page < 1 { 1 } else { self.page },
            size: clamp_size(self.size),
        }
    }

    /// Returns the zero-based offset of the first item on the page.
    #[must_use]
    pub const fn offset(self) -> usize {
        let clamped = self.clamped();
        (clamped.page - 1) * clamped.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 25 }
    }
}

const fn clamp_size(size: usize) -> usize {
    if size < 1 {
        1
    } else if size > MAX_PAGE_SIZE {
        MAX_PAGE_SIZE
    } else {
        size
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    /// Tasks on this page, in sort order.
    pub items: Vec<Task>,
    /// Total matches across all pages.
    pub total: usize,
    /// Effective (clamped) page number served.
    pub page: usize,
    /// Effective (clamped) page size served.
    pub size: usize,
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found or has been soft-deleted.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored version no longer matches the version the caller read.
    #[error("version conflict on task {task}: expected {expected}, stored {actual}")]
    VersionConflict {
        /// Task whose update was rejected.
        task: TaskId,
        /// Version the caller presented.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Domain validation failed while applying a change.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
