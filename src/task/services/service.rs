//! Task service: the single caller-facing entry point.
//!
//! Every operation receives an authenticated [`Caller`] and checks the
//! required [`Capability`] through the authorizer port before touching any
//! state. The service owns the status transition table, the optimistic
//! retry contract, and the per-project serialisation of edge mutations;
//! stores never enforce cross-component rules on their own.

use crate::schedule::{
    self, CriticalPath, DateRange, ScheduleError, ScheduleSnapshot, WorkloadReport,
};
use crate::task::{
    domain::{
        AllocationPercent, AssignmentRole, DependencyId, DependencyType, NewTask, Priority,
        ProjectId, Task, TaskAssignment, TaskDependency, TaskDomainError, TaskId, TaskPatch,
        TaskStatus, TransitionTable, UserId,
    },
    ports::{
        AssignmentLedger, AssignmentLedgerError, Authorizer, AuthorizerError, Caller, Capability,
        DependencyGraph, DependencyGraphError, PageRequest, TaskFilter, TaskPage, TaskSort,
        TaskStore, TaskStoreError,
    },
    services::ProjectLocks,
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The caller lacks the required capability on the target project.
    #[error("user {user} lacks {capability} on project {project}")]
    PermissionDenied {
        /// Caller that was rejected.
        user: UserId,
        /// Project the operation targeted.
        project: ProjectId,
        /// Capability that was required.
        capability: Capability,
    },

    /// Deletion blocked by outgoing dependency edges.
    #[error("task {task} is predecessor of {} dependent task(s)", blocking.len())]
    DependencyExists {
        /// Task whose deletion was blocked.
        task: TaskId,
        /// Tasks depending on it through active edges.
        blocking: Vec<TaskId>,
    },

    /// A dependency edge would span two projects.
    #[error("dependency endpoints belong to different projects ({predecessor} and {successor})")]
    ProjectMismatch {
        /// Project of the predecessor task.
        predecessor: ProjectId,
        /// Project of the successor task.
        successor: ProjectId,
    },

    /// The referenced dependency edge does not exist.
    #[error("dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),

    /// Dependency graph operation failed.
    #[error(transparent)]
    Graph(#[from] DependencyGraphError),

    /// Assignment ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] AssignmentLedgerError),

    /// Schedule computation failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Permission backend failed.
    #[error(transparent)]
    Authorization(#[from] AuthorizerError),
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Search request scoped to one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSearchRequest {
    project_id: ProjectId,
    status: Option<TaskStatus>,
    priority: Option<Priority>,
    assignee: Option<UserId>,
    title_contains: Option<String>,
    sort: TaskSort,
    page: PageRequest,
}

impl TaskSearchRequest {
    /// Creates a request matching every active task in the project.
    #[must_use]
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            ..Self::default()
        }
    }

    /// Restricts to a status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to a priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Restricts to tasks actively assigned to a user.
    #[must_use]
    pub const fn with_assignee(mut self, user_id: UserId) -> Self {
        self.assignee = Some(user_id);
        self
    }

    /// Restricts to titles containing a substring (case-insensitive).
    #[must_use]
    pub fn with_title_contains(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn with_sort(mut self, sort: TaskSort) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the requested page.
    #[must_use]
    pub const fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

/// Orchestration service over the task ports.
#[derive(Clone)]
pub struct TaskService<S, G, L, A, C>
where
    S: TaskStore,
    G: DependencyGraph,
    L: AssignmentLedger,
    A: Authorizer,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    graph: Arc<G>,
    ledger: Arc<L>,
    authorizer: Arc<A>,
    clock: Arc<C>,
    transitions: TransitionTable,
    project_locks: ProjectLocks,
}

impl<S, G, L, A, C> TaskService<S, G, L, A, C>
where
    S: TaskStore,
    G: DependencyGraph,
    L: AssignmentLedger,
    A: Authorizer,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default transition table.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        graph: Arc<G>,
        ledger: Arc<L>,
        authorizer: Arc<A>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            store,
            graph,
            ledger,
            authorizer,
            clock,
            transitions: TransitionTable::default(),
            project_locks: ProjectLocks::new(),
        }
    }

    /// Replaces the status transition table.
    #[must_use]
    pub fn with_transition_table(mut self, table: TransitionTable) -> Self {
        self.transitions = table;
        self
    }

    async fn authorize(
        &self,
        caller: &Caller,
        project_id: ProjectId,
        capability: Capability,
    ) -> TaskServiceResult<()> {
        if self
            .authorizer
            .is_allowed(caller, project_id, capability)
            .await?
        {
            Ok(())
        } else {
            Err(TaskServiceError::PermissionDenied {
                user: caller.user_id(),
                project: project_id,
                capability,
            })
        }
    }

    /// Creates a task owned by the input's project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without
    /// [`Capability::CreateTask`], [`TaskServiceError::Domain`] on invalid
    /// input, or [`TaskServiceError::Store`] when persistence rejects the
    /// record.
    pub async fn create_task(&self, input: NewTask, caller: &Caller) -> TaskServiceResult<Task> {
        self.authorize(caller, input.project_id(), Capability::CreateTask)
            .await?;
        let task = Task::new(input, caller.user_id(), &*self.clock)?;
        self.store.create(&task).await?;
        Ok(task)
    }

    /// Fetches a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] (wrapped) for missing or
    /// soft-deleted tasks and [`TaskServiceError::PermissionDenied`]
    /// without [`Capability::ViewTasks`] on the task's project.
    pub async fn get_task(&self, id: TaskId, caller: &Caller) -> TaskServiceResult<Task> {
        let task = self.store.get(id).await?;
        self.authorize(caller, task.project_id(), Capability::ViewTasks)
            .await?;
        Ok(task)
    }

    /// Applies a field-level patch under optimistic concurrency.
    ///
    /// A [`TaskStoreError::VersionConflict`] (wrapped) is retryable: the
    /// caller re-reads the task and resubmits against the fresh version.
    ///
    /// # Errors
    ///
    /// Returns the version conflict above, permission and validation
    /// errors, or [`TaskStoreError::NotFound`] for missing tasks.
    pub async fn update_task(
        &self,
        id: TaskId,
        patch: &TaskPatch,
        expected_version: u64,
        caller: &Caller,
    ) -> TaskServiceResult<Task> {
        let mut task = self.store.get(id).await?;
        self.authorize(caller, task.project_id(), Capability::EditTask)
            .await?;
        if task.version() != expected_version {
            return Err(TaskStoreError::VersionConflict {
                task: id,
                expected: expected_version,
                actual: task.version(),
            }
            .into());
        }
        task.apply_patch(patch, caller.user_id(), &*self.clock)?;
        self.store.update(&task, expected_version).await?;
        Ok(task)
    }

    /// Moves a task through the status state machine.
    ///
    /// Reopening a completed task additionally requires
    /// [`Capability::ReopenTask`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] (wrapped) when the
    /// table forbids the change, plus the usual permission, not-found, and
    /// version-conflict errors.
    pub async fn transition_status(
        &self,
        id: TaskId,
        new_status: TaskStatus,
        caller: &Caller,
    ) -> TaskServiceResult<Task> {
        let mut task = self.store.get(id).await?;
        self.authorize(caller, task.project_id(), Capability::EditTask)
            .await?;
        if TransitionTable::is_reopen(task.status(), new_status) {
            self.authorize(caller, task.project_id(), Capability::ReopenTask)
                .await?;
        }
        let expected_version = task.version();
        task.transition_to(new_status, &self.transitions, caller.user_id(), &*self.clock)?;
        self.store.update(&task, expected_version).await?;
        Ok(task)
    }

    /// Assigns a user to a task with a role and allocation percentage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidAllocation`] (wrapped) for
    /// allocations over 100 and
    /// [`AssignmentLedgerError::DuplicateActiveAssignment`] (wrapped) when
    /// the tuple is already active.
    pub async fn assign_user(
        &self,
        task_id: TaskId,
        user_id: UserId,
        role: AssignmentRole,
        allocation: u8,
        caller: &Caller,
    ) -> TaskServiceResult<TaskAssignment> {
        let task = self.store.get(task_id).await?;
        self.authorize(caller, task.project_id(), Capability::AssignUsers)
            .await?;
        let percent = AllocationPercent::new(allocation)?;
        let assignment = TaskAssignment::new(task_id, user_id, role, percent, &*self.clock);
        self.ledger.assign(&assignment).await?;
        Ok(assignment)
    }

    /// Ends a user's active assignment on a task.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentLedgerError::NoActiveAssignment`] (wrapped) when
    /// nothing matching the tuple is active.
    pub async fn unassign_user(
        &self,
        task_id: TaskId,
        user_id: UserId,
        role: AssignmentRole,
        caller: &Caller,
    ) -> TaskServiceResult<TaskAssignment> {
        let task = self.store.get(task_id).await?;
        self.authorize(caller, task.project_id(), Capability::AssignUsers)
            .await?;
        let closed = self
            .ledger
            .unassign(task_id, user_id, role, self.clock.utc())
            .await?;
        Ok(closed)
    }

    /// Adds a precedence edge between two tasks of the same project.
    ///
    /// The cycle check and the insert run under the project's lock so two
    /// concurrent insertions cannot jointly close a cycle.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectMismatch`] for cross-project
    /// edges, [`TaskDomainError::SelfDependency`] (wrapped) for
    /// self-references, and [`DependencyGraphError::CircularDependency`] or
    /// [`DependencyGraphError::DuplicateDependency`] (wrapped) from the
    /// graph.
    pub async fn add_dependency(
        &self,
        predecessor_id: TaskId,
        successor_id: TaskId,
        dependency_type: DependencyType,
        lag_days: i32,
        caller: &Caller,
    ) -> TaskServiceResult<TaskDependency> {
        let predecessor = self.store.get(predecessor_id).await?;
        let successor = self.store.get(successor_id).await?;
        if predecessor.project_id() != successor.project_id() {
            return Err(TaskServiceError::ProjectMismatch {
                predecessor: predecessor.project_id(),
                successor: successor.project_id(),
            });
        }
        let project_id = predecessor.project_id();
        self.authorize(caller, project_id, Capability::ManageDependencies)
            .await?;
        let dependency = TaskDependency::new(
            project_id,
            predecessor_id,
            successor_id,
            dependency_type,
            lag_days,
            caller.user_id(),
            &*self.clock,
        )?;

        let lock = self.project_locks.lock_for(project_id);
        let _guard = lock.lock().await;
        self.graph.add_edge(&dependency).await?;
        Ok(dependency)
    }

    /// Removes a precedence edge.
    ///
    /// Removal cannot create a cycle, so no project lock is taken.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::DependencyNotFound`] when the edge does
    /// not exist.
    pub async fn remove_dependency(
        &self,
        id: DependencyId,
        caller: &Caller,
    ) -> TaskServiceResult<()> {
        let edge = self
            .graph
            .get_edge(id)
            .await?
            .ok_or(TaskServiceError::DependencyNotFound(id))?;
        self.authorize(caller, edge.project_id(), Capability::ManageDependencies)
            .await?;
        self.graph.remove_edge(id).await?;
        Ok(())
    }

    /// Soft-deletes a task.
    ///
    /// With `cascade` unset, deletion is blocked while the task is
    /// predecessor in any edge; with it set, those edges are removed first.
    /// Both the gate and the cascade run under the project's lock so a
    /// concurrent edge insertion cannot slip between them.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::DependencyExists`] when blocked, plus
    /// the usual permission and not-found errors.
    pub async fn delete_task(
        &self,
        id: TaskId,
        caller: &Caller,
        cascade: bool,
    ) -> TaskServiceResult<()> {
        let task = self.store.get(id).await?;
        self.authorize(caller, task.project_id(), Capability::DeleteTask)
            .await?;

        let lock = self.project_locks.lock_for(task.project_id());
        let _guard = lock.lock().await;
        let blocking = self.graph.successors_of(id).await?;
        if !blocking.is_empty() {
            if !cascade {
                return Err(TaskServiceError::DependencyExists { task: id, blocking });
            }
            self.graph.remove_edges_from(id).await?;
        }
        self.store
            .soft_delete(id, caller.user_id(), self.clock.utc())
            .await?;
        Ok(())
    }

    /// Computes the critical path of a project from a call-time snapshot.
    ///
    /// No lock is held: a concurrent edge mutation may make the result
    /// stale but never inconsistent.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::CyclicGraph`] (wrapped) only for snapshots
    /// that bypass the graph port's acyclicity guarantee.
    pub async fn get_critical_path(
        &self,
        project_id: ProjectId,
        caller: &Caller,
    ) -> TaskServiceResult<CriticalPath> {
        self.authorize(caller, project_id, Capability::ViewTasks)
            .await?;
        let tasks = self.store.list_by_project(project_id).await?;
        let edges = self.graph.edges_for_project(project_id).await?;
        let snapshot = ScheduleSnapshot::new(tasks, edges);
        Ok(schedule::critical_path(&snapshot)?)
    }

    /// Sums a user's workload over a date range.
    ///
    /// Only assignments on tasks in projects the caller may view
    /// contribute to the report.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Ledger`] or [`TaskServiceError::Store`]
    /// on persistence failures.
    pub async fn get_workload(
        &self,
        user_id: UserId,
        range: DateRange,
        caller: &Caller,
    ) -> TaskServiceResult<WorkloadReport> {
        let assignments = self.ledger.active_for_user(user_id).await?;
        let mut visible_tasks: Vec<Task> = Vec::new();
        let mut visible_assignments: Vec<TaskAssignment> = Vec::new();
        for assignment in assignments {
            match self.store.get(assignment.task_id()).await {
                Ok(task) => {
                    if self
                        .authorizer
                        .is_allowed(caller, task.project_id(), Capability::ViewTasks)
                        .await?
                    {
                        visible_tasks.push(task);
                        visible_assignments.push(assignment);
                    }
                }
                Err(TaskStoreError::NotFound(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(schedule::workload(
            &visible_assignments,
            &visible_tasks,
            &range,
        ))
    }

    /// Searches a project's active tasks.
    ///
    /// An assignee filter is resolved through the ledger into an explicit
    /// id set before delegating to the store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without
    /// [`Capability::ViewTasks`] on the project.
    pub async fn search_tasks(
        &self,
        request: TaskSearchRequest,
        caller: &Caller,
    ) -> TaskServiceResult<TaskPage> {
        self.authorize(caller, request.project_id, Capability::ViewTasks)
            .await?;
        let id_in = match request.assignee {
            Some(user_id) => {
                let assignments = self.ledger.active_for_user(user_id).await?;
                Some(
                    assignments
                        .iter()
                        .map(TaskAssignment::task_id)
                        .collect::<HashSet<TaskId>>(),
                )
            }
            None => None,
        };
        let filter = TaskFilter {
            project_id: Some(request.project_id),
            status: request.status,
            priority: request.priority,
            title_contains: request.title_contains,
            id_in,
        };
        Ok(self.store.search(&filter, request.sort, request.page).await?)
    }
}
