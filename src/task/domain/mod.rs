//! Domain model for task, dependency, and assignment management.
//!
//! The task domain models task records with lifecycle state, soft delete,
//! and optimistic versioning; directed precedence edges; and task/user
//! assignments, while keeping all infrastructure concerns outside of the
//! domain boundary.

mod assignment;
mod dependency;
mod error;
mod ids;
mod status;
mod task;

pub use assignment::{AllocationPercent, AssignmentRole, TaskAssignment};
pub use dependency::{DependencyType, TaskDependency};
pub use error::{
    ParseAssignmentRoleError, ParseDependencyTypeError, ParsePriorityError, ParseTaskStatusError,
    TaskDomainError,
};
pub use ids::{AssignmentId, DependencyId, ProjectId, TaskId, UserId};
pub use status::{Priority, TaskStatus, TransitionTable};
pub use task::{NewTask, PatchField, PersistedTaskData, Task, TaskPatch, MAX_TITLE_CHARS};
