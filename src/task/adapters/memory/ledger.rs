//! In-memory assignment ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{AssignmentId, AssignmentRole, TaskAssignment, TaskId, UserId},
    ports::{AssignmentLedger, AssignmentLedgerError, AssignmentLedgerResult},
};

/// Thread-safe in-memory assignment ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentLedger {
    state: Arc<RwLock<LedgerState>>,
}

#[derive(Debug, Default)]
struct LedgerState {
    assignments: HashMap<AssignmentId, TaskAssignment>,
}

impl InMemoryAssignmentLedger {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerState {
    fn active_matching(
        &self,
        task_id: TaskId,
        user_id: UserId,
        role: AssignmentRole,
    ) -> Option<AssignmentId> {
        self.assignments
            .values()
            .find(|assignment| {
                assignment.is_active()
                    && assignment.task_id() == task_id
                    && assignment.user_id() == user_id
                    && assignment.role() == role
            })
            .map(TaskAssignment::id)
    }
}

fn sorted_oldest_first(mut assignments: Vec<TaskAssignment>) -> Vec<TaskAssignment> {
    assignments.sort_by(|a, b| {
        a.assigned_at()
            .cmp(&b.assigned_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
    assignments
}

#[async_trait]
impl AssignmentLedger for InMemoryAssignmentLedger {
    async fn assign(&self, assignment: &TaskAssignment) -> AssignmentLedgerResult<()> {
        let mut state = self.state.write().map_err(|err| {
            AssignmentLedgerError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state
            .active_matching(assignment.task_id(), assignment.user_id(), assignment.role())
            .is_some()
        {
            return Err(AssignmentLedgerError::DuplicateActiveAssignment {
                task: assignment.task_id(),
                user: assignment.user_id(),
                role: assignment.role(),
            });
        }
        state.assignments.insert(assignment.id(), assignment.clone());
        Ok(())
    }

    async fn unassign(
        &self,
        task_id: TaskId,
        user_id: UserId,
        role: AssignmentRole,
        at: DateTime<Utc>,
    ) -> AssignmentLedgerResult<TaskAssignment> {
        let mut state = self.state.write().map_err(|err| {
            AssignmentLedgerError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let id = state.active_matching(task_id, user_id, role).ok_or(
            AssignmentLedgerError::NoActiveAssignment {
                task: task_id,
                user: user_id,
                role,
            },
        )?;
        let assignment = state
            .assignments
            .get_mut(&id)
            .ok_or(AssignmentLedgerError::NoActiveAssignment {
                task: task_id,
                user: user_id,
                role,
            })?;
        assignment.close(at);
        Ok(assignment.clone())
    }

    async fn active_for_task(
        &self,
        task_id: TaskId,
    ) -> AssignmentLedgerResult<Vec<TaskAssignment>> {
        let state = self.state.read().map_err(|err| {
            AssignmentLedgerError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let matches: Vec<TaskAssignment> = state
            .assignments
            .values()
            .filter(|assignment| assignment.is_active() && assignment.task_id() == task_id)
            .cloned()
            .collect();
        Ok(sorted_oldest_first(matches))
    }

    async fn active_for_user(
        &self,
        user_id: UserId,
    ) -> AssignmentLedgerResult<Vec<TaskAssignment>> {
        let state = self.state.read().map_err(|err| {
            AssignmentLedgerError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let matches: Vec<TaskAssignment> = state
            .assignments
            .values()
            .filter(|assignment| assignment.is_active() && assignment.user_id() == user_id)
            .cloned()
            .collect();
        Ok(sorted_oldest_first(matches))
    }
}
