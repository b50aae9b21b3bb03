//! Project-keyed mutex registry.

use crate::task::domain::ProjectId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

/// Registry of per-project async mutexes.
///
/// Edge mutations validate acyclicity against a snapshot and then write;
/// two concurrent insertions that are each individually acyclic can jointly
/// close a cycle if both validate against stale snapshots. Holding the
/// project's lock across the validate-then-write window removes that race,
/// while mutations on different projects proceed concurrently. For
/// multi-instance deployments the same guarantee is obtained with a
/// database advisory lock keyed by project id behind the graph port.
#[derive(Debug, Clone, Default)]
pub struct ProjectLocks {
    locks: Arc<Mutex<HashMap<ProjectId, Arc<AsyncMutex<()>>>>>,
}

impl ProjectLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mutex for a project, creating it on first use.
    ///
    /// A poisoned registry lock is recovered rather than propagated: the
    /// registry holds no invariants beyond the map itself.
    #[must_use]
    pub fn lock_for(&self, project_id: ProjectId) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(project_id).or_default().clone()
    }
}
