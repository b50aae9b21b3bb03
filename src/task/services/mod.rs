//! Application services orchestrating tasks, dependencies, assignments,
//! and schedule reads.

mod locks;
mod service;

pub use locks::ProjectLocks;
pub use service::{TaskSearchRequest, TaskService, TaskServiceError, TaskServiceResult};
