//! Task aggregate root, creation input, and patch types.

use super::{Priority, ProjectId, TaskDomainError, TaskId, TaskStatus, TransitionTable, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum task title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Task aggregate root.
///
/// Fields are private; all mutation flows through validated methods that
/// bump the optimistic-concurrency version and refresh the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    parent_task_id: Option<TaskId>,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    held_from: Option<TaskStatus>,
    priority: Priority,
    estimated_start_date: Option<NaiveDate>,
    estimated_end_date: Option<NaiveDate>,
    actual_start_date: Option<NaiveDate>,
    actual_end_date: Option<NaiveDate>,
    version: u64,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<UserId>,
    created_at: DateTime<Utc>,
    created_by: UserId,
    updated_at: DateTime<Utc>,
    updated_by: UserId,
}

/// Input for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    priority: Option<Priority>,
    estimated_start_date: Option<NaiveDate>,
    estimated_end_date: Option<NaiveDate>,
    parent_task_id: Option<TaskId>,
}

impl NewTask {
    /// Creates input with the required fields.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            priority: None,
            estimated_start_date: None,
            estimated_end_date: None,
            parent_task_id: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task priority (defaults to [`Priority::Medium`]).
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the estimated start and end dates.
    #[must_use]
    pub const fn with_estimated_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.estimated_start_date = Some(start);
        self.estimated_end_date = Some(end);
        self
    }

    /// Sets only the estimated start date.
    #[must_use]
    pub const fn with_estimated_start(mut self, start: NaiveDate) -> Self {
        self.estimated_start_date = Some(start);
        self
    }

    /// Sets the parent task for subtask hierarchies.
    #[must_use]
    pub const fn with_parent(mut self, parent_task_id: TaskId) -> Self {
        self.parent_task_id = Some(parent_task_id);
        self
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }
}

/// Tri-state patch value distinguishing "leave unchanged" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchField<T> {
    /// Leave the current value unchanged.
    #[default]
    Keep,
    /// Replace the current value.
    Set(T),
    /// Clear the current value.
    Clear,
}

impl<T: Clone> PatchField<T> {
    /// Resolves the patch against the current value.
    #[must_use]
    pub fn resolve(&self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Set(value) => Some(value.clone()),
            Self::Clear => None,
        }
    }
}

/// Field-level update to an existing task.
///
/// Status is deliberately absent: status changes go through
/// [`Task::transition_to`] so the state machine cannot be bypassed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Replacement title, when present.
    pub title: Option<String>,
    /// Description update.
    pub description: PatchField<String>,
    /// Replacement priority, when present.
    pub priority: Option<Priority>,
    /// Estimated start date update.
    pub estimated_start_date: PatchField<NaiveDate>,
    /// Estimated end date update.
    pub estimated_end_date: PatchField<NaiveDate>,
    /// Actual start date update.
    pub actual_start_date: PatchField<NaiveDate>,
    /// Actual end date update.
    pub actual_end_date: PatchField<NaiveDate>,
    /// Parent task update.
    pub parent_task_id: PatchField<TaskId>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning project.
    pub project_id: ProjectId,
    /// Persisted parent task, if any.
    pub parent_task_id: Option<TaskId>,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted pre-hold status, if the task is on hold.
    pub held_from: Option<TaskStatus>,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted estimated start date.
    pub estimated_start_date: Option<NaiveDate>,
    /// Persisted estimated end date.
    pub estimated_end_date: Option<NaiveDate>,
    /// Persisted actual start date.
    pub actual_start_date: Option<NaiveDate>,
    /// Persisted actual end date.
    pub actual_end_date: Option<NaiveDate>,
    /// Persisted optimistic-concurrency version.
    pub version: u64,
    /// Persisted soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Persisted soft-delete principal.
    pub deleted_by: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted creating principal.
    pub created_by: UserId,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted latest mutating principal.
    pub updated_by: UserId,
}

impl Task {
    /// Creates a new task with defaulted status and priority.
    ///
    /// The task starts at version 1 in [`TaskStatus::NotStarted`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] or
    /// [`TaskDomainError::TitleTooLong`] for invalid titles,
    /// [`TaskDomainError::InvertedDates`] when the estimated end date
    /// precedes the estimated start date.
    pub fn new(input: NewTask, created_by: UserId, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = validate_title(&input.title)?;
        validate_date_order(input.estimated_start_date, input.estimated_end_date)?;
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            project_id: input.project_id,
            parent_task_id: input.parent_task_id,
            title,
            description: input.description,
            status: TaskStatus::NotStarted,
            held_from: None,
            priority: input.priority.unwrap_or_default(),
            estimated_start_date: input.estimated_start_date,
            estimated_end_date: input.estimated_end_date,
            actual_start_date: None,
            actual_end_date: None,
            version: 1,
            deleted_at: None,
            deleted_by: None,
            created_at: timestamp,
            created_by,
            updated_at: timestamp,
            updated_by: created_by,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            parent_task_id: data.parent_task_id,
            title: data.title,
            description: data.description,
            status: data.status,
            held_from: data.held_from,
            priority: data.priority,
            estimated_start_date: data.estimated_start_date,
            estimated_end_date: data.estimated_end_date,
            actual_start_date: data.actual_start_date,
            actual_end_date: data.actual_end_date,
            version: data.version,
            deleted_at: data.deleted_at,
            deleted_by: data.deleted_by,
            created_at: data.created_at,
            created_by: data.created_by,
            updated_at: data.updated_at,
            updated_by: data.updated_by,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the parent task, if any.
    #[must_use]
    pub const fn parent_task_id(&self) -> Option<TaskId> {
        self.parent_task_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the status the task was paused from, while on hold.
    #[must_use]
    pub const fn held_from(&self) -> Option<TaskStatus> {
        self.held_from
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the estimated start date.
    #[must_use]
    pub const fn estimated_start_date(&self) -> Option<NaiveDate> {
        self.estimated_start_date
    }

    /// Returns the estimated end date.
    #[must_use]
    pub const fn estimated_end_date(&self) -> Option<NaiveDate> {
        self.estimated_end_date
    }

    /// Returns the actual start date.
    #[must_use]
    pub const fn actual_start_date(&self) -> Option<NaiveDate> {
        self.actual_start_date
    }

    /// Returns the actual end date.
    #[must_use]
    pub const fn actual_end_date(&self) -> Option<NaiveDate> {
        self.actual_end_date
    }

    /// Returns the optimistic-concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns whether the task has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the soft-delete timestamp, if any.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns the soft-deleting principal, if any.
    #[must_use]
    pub const fn deleted_by(&self) -> Option<UserId> {
        self.deleted_by
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

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the latest mutating principal.
    #[must_use]
    pub const fn updated_by(&self) -> UserId {
        self.updated_by
    }

    /// Estimated duration in whole days, inclusive of neither endpoint
    /// beyond the span itself.
    ///
    /// Tasks missing either estimated date have zero duration and behave as
    /// milestones in scheduling.
    #[must_use]
    pub fn estimated_duration_days(&self) -> i64 {
        match (self.estimated_start_date, self.estimated_end_date) {
            (Some(start), Some(end)) => end.signed_duration_since(start).num_days(),
            _ => 0,
        }
    }

    /// Applies a field-level patch, revalidating title and date invariants.
    ///
    /// Bumps the version and refreshes the audit trail on success; leaves
    /// the task untouched on failure.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`],
    /// [`TaskDomainError::TitleTooLong`],
    /// [`TaskDomainError::InvertedDates`], or
    /// [`TaskDomainError::SelfParent`] when the patched state would violate
    /// an invariant.
    pub fn apply_patch(
        &mut self,
        patch: &TaskPatch,
        updated_by: UserId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let title = match &patch.title {
            Some(new_title) => validate_title(new_title)?,
            None => self.title.clone(),
        };
        let estimated_start = patch.estimated_start_date.resolve(self.estimated_start_date);
        let estimated_end = patch.estimated_end_date.resolve(self.estimated_end_date);
        validate_date_order(estimated_start, estimated_end)?;
        let actual_start = patch.actual_start_date.resolve(self.actual_start_date);
        let actual_end = patch.actual_end_date.resolve(self.actual_end_date);
        validate_date_order(actual_start, actual_end)?;
        let parent = patch.parent_task_id.resolve(self.parent_task_id);
        if parent == Some(self.id) {
            return Err(TaskDomainError::SelfParent(self.id));
        }

        self.title = title;
        self.description = patch.description.resolve(self.description.take());
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.estimated_start_date = estimated_start;
        self.estimated_end_date = estimated_end;
        self.actual_start_date = actual_start;
        self.actual_end_date = actual_end;
        self.parent_task_id = parent;
        self.bump(updated_by, clock);
        Ok(())
    }

    /// Transitions the task to a new status.
    ///
    /// The transition must be permitted by `table`; resuming from
    /// [`TaskStatus::OnHold`] must return to the status the task was paused
    /// from. Entering `in_progress` records the actual start date, entering
    /// `completed` records the actual end date, and reopening a completed
    /// task clears the actual end date.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the table forbids
    /// the change and [`TaskDomainError::HoldOriginMismatch`] when a held
    /// task resumes to the wrong status.
    pub fn transition_to(
        &mut self,
        to: TaskStatus,
        table: &TransitionTable,
        updated_by: UserId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let from = self.status;
        if !table.allows(from, to) {
            return Err(TaskDomainError::InvalidTransition { from, to });
        }
        if from == TaskStatus::OnHold
            && let Some(held_from) = self.held_from
            && held_from != to
        {
            return Err(TaskDomainError::HoldOriginMismatch {
                held_from,
                requested: to,
            });
        }

        self.held_from = (to == TaskStatus::OnHold).then_some(from);
        self.status = to;
        let today = clock.utc().date_naive();
        match to {
            TaskStatus::InProgress => {
                self.actual_start_date.get_or_insert(today);
            }
            TaskStatus::Completed => {
                self.actual_end_date.get_or_insert(today);
            }
            TaskStatus::NotStarted if from == TaskStatus::Completed => {
                self.actual_end_date = None;
            }
            _ => {}
        }
        self.bump(updated_by, clock);
        Ok(())
    }

    /// Marks the task as soft-deleted.
    ///
    /// Soft-deleted tasks are excluded from reads, search, graph
    /// operations, and scheduling, but retained for audit history.
    pub fn mark_deleted(&mut self, deleted_by: UserId, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.deleted_by = Some(deleted_by);
        self.version += 1;
        self.updated_at = at;
        self.updated_by = deleted_by;
    }

    /// Bumps the version and refreshes the audit trail.
    fn bump(&mut self, updated_by: UserId, clock: &impl Clock) {
        self.version += 1;
        self.updated_at = clock.utc();
        self.updated_by = updated_by;
    }
}

/// Validates and normalises a task title.
fn validate_title(raw: &str) -> Result<String, TaskDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    let length = trimmed.chars().count();
    if length > MAX_TITLE_CHARS {
        return Err(TaskDomainError::TitleTooLong {
            length,
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(trimmed.to_owned())
}

/// Rejects date pairs whose end precedes their start.
fn validate_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), TaskDomainError> {
    if let (Some(start_date), Some(end_date)) = (start, end)
        && end_date < start_date
    {
        return Err(TaskDomainError::InvertedDates {
            start: start_date,
            end: end_date,
        });
    }
    Ok(())
}
