//! In-memory task store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{ProjectId, Task, TaskId, UserId},
    ports::{
        PageRequest, SortDirection, SortField, TaskFilter, TaskPage, TaskSort, TaskStore,
        TaskStoreError, TaskStoreResult,
    },
};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: HashMap<TaskId, Task>,
    project_index: HashMap<ProjectId, Vec<TaskId>>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(task: &Task, filter: &TaskFilter) -> bool {
    if let Some(project_id) = filter.project_id
        && task.project_id() != project_id
    {
        return false;
    }
    if let Some(status) = filter.status
        && task.status() != status
    {
        return false;
    }
    if let Some(priority) = filter.priority
        && task.priority() != priority
    {
        return false;
    }
    if let Some(needle) = &filter.title_contains
        && !task
            .title()
            .to_lowercase()
            .contains(&needle.to_lowercase())
    {
        return false;
    }
    if let Some(ids) = &filter.id_in
        && !ids.contains(&task.id())
    {
        return false;
    }
    true
}

fn compare_by_field(a: &Task, b: &Task, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title().cmp(b.title()),
        SortField::Priority => a.priority().cmp(&b.priority()),
        SortField::Status => a.status().cmp(&b.status()),
        SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortField::EstimatedStartDate => a.estimated_start_date().cmp(&b.estimated_start_date()),
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        state
            .project_index
            .entry(task.project_id())
            .or_default()
            .push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn get(&self, id: TaskId) -> TaskStoreResult<Task> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))?;
        state
            .tasks
            .get(&id)
            .filter(|task| !task.is_deleted())
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))
    }

    async fn update(&self, task: &Task, expected_version: u64) -> TaskStoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))?;
        let stored = state
            .tasks
            .get(&task.id())
            .filter(|current| !current.is_deleted())
            .ok_or(TaskStoreError::NotFound(task.id()))?;
        if stored.version() != expected_version {
            return Err(TaskStoreError::VersionConflict {
                task: task.id(),
                expected: expected_version,
                actual: stored.version(),
            });
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn soft_delete(
        &self,
        id: TaskId,
        deleted_by: UserId,
        deleted_at: DateTime<Utc>,
    ) -> TaskStoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))?;
        let stored = state
            .tasks
            .get_mut(&id)
            .filter(|current| !current.is_deleted())
            .ok_or(TaskStoreError::NotFound(id))?;
        stored.mark_deleted(deleted_by, deleted_at);
        Ok(())
    }

    async fn list_by_project(&self, project_id: ProjectId) -> TaskStoreResult<Vec<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))?;
        let mut tasks: Vec<Task> = state
            .project_index
            .get(&project_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.tasks.get(id))
            .filter(|task| !task.is_deleted())
            .cloned()
            .collect();
        tasks.sort_by_key(Task::id);
        Ok(tasks)
    }

    async fn search(
        &self,
        filter: &TaskFilter,
        sort: TaskSort,
        page: PageRequest,
    ) -> TaskStoreResult<TaskPage> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))?;
        let mut matches: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| !task.is_deleted())
            .filter(|task| matches_filter(task, filter))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            let by_field = match sort.direction {
                SortDirection::Ascending => compare_by_field(a, b, sort.field),
                SortDirection::Descending => compare_by_field(a, b, sort.field).reverse(),
            };
            by_field.then_with(|| a.id().cmp(&b.id()))
        });

        let total = matches.len();
        let effective = page.clamped();
        let items: Vec<Task> = matches
            .into_iter()
            .skip(effective.offset())
            .take(effective.size)
            .collect();
        Ok(TaskPage {
            items,
            total,
            page: effective.page,
            size: effective.size,
        })
    }
}
