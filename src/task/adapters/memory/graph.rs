//! In-memory dependency graph with insertion-time cycle detection.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{DependencyId, ProjectId, TaskDependency, TaskId},
    ports::{DependencyGraph, DependencyGraphError, DependencyGraphResult},
};

/// Thread-safe in-memory dependency graph.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDependencyGraph {
    state: Arc<RwLock<GraphState>>,
}

#[derive(Debug, Default)]
struct GraphState {
    edges: HashMap<DependencyId, TaskDependency>,
    project_index: HashMap<ProjectId, Vec<DependencyId>>,
}

impl InMemoryDependencyGraph {
    /// Creates an empty in-memory graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphState {
    fn project_edges(&self, project_id: ProjectId) -> Vec<&TaskDependency> {
        self.project_index
            .get(&project_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
            .collect()
    }

    /// Breadth-first reachability over one project's edges.
    ///
    /// Rebuilt from the current edge set on every call so the check never
    /// operates on a stale index.
    fn reaches(&self, project_id: ProjectId, from: TaskId, to: TaskId) -> bool {
        let mut adjacency: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for edge in self.project_edges(project_id) {
            adjacency
                .entry(edge.predecessor_task_id())
                .or_default()
                .push(edge.successor_task_id());
        }

        let mut visited: HashSet<TaskId> = HashSet::new();
        let mut queue: VecDeque<TaskId> = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(next) = adjacency.get(&current) {
                queue.extend(next.iter().copied());
            }
        }
        false
    }

    fn remove(&mut self, id: DependencyId) -> Option<TaskDependency> {
        let edge = self.edges.remove(&id)?;
        if let Some(ids) = self.project_index.get_mut(&edge.project_id()) {
            ids.retain(|edge_id| *edge_id != id);
            if ids.is_empty() {
                self.project_index.remove(&edge.project_id());
            }
        }
        Some(edge)
    }
}

#[async_trait]
impl DependencyGraph for InMemoryDependencyGraph {
    async fn add_edge(&self, dependency: &TaskDependency) -> DependencyGraphResult<()> {
        let mut state = self.state.write().map_err(|err| {
            DependencyGraphError::persistence(std::io::Error::other(err.to_string()))
        })?;

        let predecessor = dependency.predecessor_task_id();
        let successor = dependency.successor_task_id();
        let duplicate = state
            .project_edges(dependency.project_id())
            .iter()
            .any(|edge| {
                edge.predecessor_task_id() == predecessor && edge.successor_task_id() == successor
            });
        if duplicate {
            return Err(DependencyGraphError::DuplicateDependency {
                predecessor,
                successor,
            });
        }
        if state.reaches(dependency.project_id(), successor, predecessor) {
            return Err(DependencyGraphError::CircularDependency {
                predecessor,
                successor,
            });
        }

        state
            .project_index
            .entry(dependency.project_id())
            .or_default()
            .push(dependency.id());
        state.edges.insert(dependency.id(), dependency.clone());
        Ok(())
    }

    async fn get_edge(&self, id: DependencyId) -> DependencyGraphResult<Option<TaskDependency>> {
        let state = self.state.read().map_err(|err| {
            DependencyGraphError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.edges.get(&id).cloned())
    }

    async fn remove_edge(&self, id: DependencyId) -> DependencyGraphResult<()> {
        let mut state = self.state.write().map_err(|err| {
            DependencyGraphError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.remove(id);
        Ok(())
    }

    async fn remove_edges_from(
        &self,
        predecessor_task_id: TaskId,
    ) -> DependencyGraphResult<Vec<TaskDependency>> {
        let mut state = self.state.write().map_err(|err| {
            DependencyGraphError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let outgoing: Vec<DependencyId> = state
            .edges
            .values()
            .filter(|edge| edge.predecessor_task_id() == predecessor_task_id)
            .map(TaskDependency::id)
            .collect();
        let mut removed: Vec<TaskDependency> = outgoing
            .into_iter()
            .filter_map(|id| state.remove(id))
            .collect();
        removed.sort_by_key(TaskDependency::id);
        Ok(removed)
    }

    async fn edges_for_project(
        &self,
        project_id: ProjectId,
    ) -> DependencyGraphResult<Vec<TaskDependency>> {
        let state = self.state.read().map_err(|err| {
            DependencyGraphError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .project_edges(project_id)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn predecessors_of(&self, task_id: TaskId) -> DependencyGraphResult<Vec<TaskId>> {
        let state = self.state.read().map_err(|err| {
            DependencyGraphError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut ids: Vec<TaskId> = state
            .edges
            .values()
            .filter(|edge| edge.successor_task_id() == task_id)
            .map(TaskDependency::predecessor_task_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn successors_of(&self, task_id: TaskId) -> DependencyGraphResult<Vec<TaskId>> {
        let state = self.state.read().map_err(|err| {
            DependencyGraphError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut ids: Vec<TaskId> = state
            .edges
            .values()
            .filter(|edge| edge.predecessor_task_id() == task_id)
            .map(TaskDependency::successor_task_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
