//! Critical Path Method over a dependency snapshot.
//!
//! A forward pass in topological order computes earliest start/finish per
//! task, a backward pass computes latest start/finish, and float is the gap
//! between the two. The critical path is recovered by walking tight
//! zero-float edges backwards from the task with the latest earliest
//! finish, breaking ties towards the smallest task id for determinism.

use crate::schedule::{ScheduleError, ScheduleSnapshot};
use crate::task::domain::{DependencyType, Task, TaskDependency, TaskId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Result of a critical-path computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalPath {
    /// The critical chain in execution order; empty for an empty project.
    pub path: Vec<TaskId>,
    /// Overall project duration in days: the longest weighted path through
    /// the DAG, accounting for dependency-type offsets and lag.
    pub duration_days: i64,
    /// Float (slack) per task; zero marks a task as critical.
    pub float_by_task: BTreeMap<TaskId, i64>,
}

struct Timings {
    duration: HashMap<TaskId, i64>,
    earliest_start: HashMap<TaskId, i64>,
    earliest_finish: HashMap<TaskId, i64>,
    latest_finish: HashMap<TaskId, i64>,
}

impl Timings {
    fn get(map: &HashMap<TaskId, i64>, id: TaskId) -> i64 {
        map.get(&id).copied().unwrap_or(0)
    }

    fn float_of(&self, id: TaskId) -> i64 {
        let latest_start = Self::get(&self.latest_finish, id) - Self::get(&self.duration, id);
        latest_start - Self::get(&self.earliest_start, id)
    }
}

/// Computes the critical path, project duration, and per-task float.
///
/// # Errors
///
/// Returns [`ScheduleError::CyclicGraph`] when the snapshot's edges do not
/// form a DAG.
pub fn critical_path(snapshot: &ScheduleSnapshot) -> Result<CriticalPath, ScheduleError> {
    if snapshot.is_empty() {
        return Ok(CriticalPath {
            path: Vec::new(),
            duration_days: 0,
            float_by_task: BTreeMap::new(),
        });
    }

    let order = topological_order(snapshot)?;
    let timings = compute_timings(snapshot, &order);

    let float_by_task: BTreeMap<TaskId, i64> = order
        .iter()
        .map(|&id| (id, timings.float_of(id)))
        .collect();
    let duration_days = timings.earliest_finish.values().copied().max().unwrap_or(0);
    let path = recover_chain(snapshot, &timings, &float_by_task);

    Ok(CriticalPath {
        path,
        duration_days,
        float_by_task,
    })
}

/// Kahn's algorithm with a deterministic (smallest-id-first) ready set.
fn topological_order(snapshot: &ScheduleSnapshot) -> Result<Vec<TaskId>, ScheduleError> {
    let mut indegree: HashMap<TaskId, usize> =
        snapshot.tasks().iter().map(|t| (t.id(), 0)).collect();
    for edge in snapshot.edges() {
        if let Some(count) = indegree.get_mut(&edge.successor_task_id()) {
            *count += 1;
        }
    }

    let mut ready: BTreeSet<TaskId> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order: Vec<TaskId> = Vec::with_capacity(indegree.len());
    while let Some(&next) = ready.iter().next() {
        ready.remove(&next);
        order.push(next);
        for edge in snapshot.edges() {
            if edge.predecessor_task_id() != next {
                continue;
            }
            if let Some(count) = indegree.get_mut(&edge.successor_task_id()) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(edge.successor_task_id());
                }
            }
        }
    }

    if order.len() == indegree.len() {
        Ok(order)
    } else {
        Err(ScheduleError::CyclicGraph)
    }
}

fn compute_timings(snapshot: &ScheduleSnapshot, order: &[TaskId]) -> Timings {
    let duration: HashMap<TaskId, i64> = snapshot
        .tasks()
        .iter()
        .map(|t| (t.id(), Task::estimated_duration_days(t)))
        .collect();
    let mut incoming: HashMap<TaskId, Vec<&TaskDependency>> = HashMap::new();
    let mut outgoing: HashMap<TaskId, Vec<&TaskDependency>> = HashMap::new();
    for edge in snapshot.edges() {
        incoming.entry(edge.successor_task_id()).or_default().push(edge);
        outgoing.entry(edge.predecessor_task_id()).or_default().push(edge);
    }

    let mut timings = Timings {
        duration,
        earliest_start: HashMap::new(),
        earliest_finish: HashMap::new(),
        latest_finish: HashMap::new(),
    };

    for &id in order {
        let task_duration = Timings::get(&timings.duration, id);
        let earliest_start = incoming
            .get(&id)
            .into_iter()
            .flatten()
            .map(|edge| earliest_start_bound(edge, &timings, task_duration))
            .max()
            .unwrap_or(0)
            .max(0);
        timings.earliest_start.insert(id, earliest_start);
        timings
            .earliest_finish
            .insert(id, earliest_start + task_duration);
    }

    let project_finish = timings.earliest_finish.values().copied().max().unwrap_or(0);
    for &id in order.iter().rev() {
        let task_duration = Timings::get(&timings.duration, id);
        let latest_finish = outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .map(|edge| latest_finish_bound(edge, &timings, task_duration))
            .min()
            .unwrap_or(project_finish)
            // A start-to-start or start-to-finish edge does not bound its
            // predecessor's finish, but the project end still does.
            .min(project_finish);
        timings.latest_finish.insert(id, latest_finish);
    }

    timings
}

/// Lower bound an edge places on its successor's earliest start.
fn earliest_start_bound(edge: &TaskDependency, timings: &Timings, successor_duration: i64) -> i64 {
    let predecessor = edge.predecessor_task_id();
    let lag = i64::from(edge.lag_days());
    match edge.dependency_type() {
        DependencyType::FinishToStart => Timings::get(&timings.earliest_finish, predecessor) + lag,
        DependencyType::StartToStart => Timings::get(&timings.earliest_start, predecessor) + lag,
        DependencyType::FinishToFinish => {
            Timings::get(&timings.earliest_finish, predecessor) + lag - successor_duration
        }
        DependencyType::StartToFinish => {
            Timings::get(&timings.earliest_start, predecessor) + lag - successor_duration
        }
    }
}

/// Upper bound an edge places on its predecessor's latest finish.
fn latest_finish_bound(edge: &TaskDependency, timings: &Timings, predecessor_duration: i64) -> i64 {
    let successor = edge.successor_task_id();
    let lag = i64::from(edge.lag_days());
    let successor_latest_finish = Timings::get(&timings.latest_finish, successor);
    let successor_latest_start =
        successor_latest_finish - Timings::get(&timings.duration, successor);
    match edge.dependency_type() {
        DependencyType::FinishToStart => successor_latest_start - lag,
        DependencyType::StartToStart => successor_latest_start - lag + predecessor_duration,
        DependencyType::FinishToFinish => successor_latest_finish - lag,
        DependencyType::StartToFinish => successor_latest_finish - lag + predecessor_duration,
    }
}

/// Walks tight zero-float edges backwards from the latest-finishing task.
fn recover_chain(
    snapshot: &ScheduleSnapshot,
    timings: &Timings,
    float_by_task: &BTreeMap<TaskId, i64>,
) -> Vec<TaskId> {
    let Some(end) = latest_finishing_task(timings) else {
        return Vec::new();
    };

    let mut chain = vec![end];
    let mut current = end;
    loop {
        let current_start = Timings::get(&timings.earliest_start, current);
        let current_duration = Timings::get(&timings.duration, current);
        let driving = snapshot
            .edges()
            .iter()
            .filter(|edge| edge.successor_task_id() == current)
            .filter(|edge| {
                float_by_task
                    .get(&edge.predecessor_task_id())
                    .copied()
                    .unwrap_or(0)
                    == 0
            })
            .filter(|edge| earliest_start_bound(edge, timings, current_duration) == current_start)
            .map(TaskDependency::predecessor_task_id)
            .min();
        match driving {
            Some(predecessor) => {
                chain.push(predecessor);
                current = predecessor;
            }
            None => break,
        }
    }
    chain.reverse();
    chain
}

/// The task with the maximum earliest finish, smallest id on ties.
fn latest_finishing_task(timings: &Timings) -> Option<TaskId> {
    timings
        .earliest_finish
        .iter()
        .map(|(&id, &finish)| (finish, id))
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)))
        .map(|(_, id)| id)
}
