//! Schedule metrics derived from task and dependency snapshots.
//!
//! Everything in this module is a pure function of its input: callers
//! assemble a [`ScheduleSnapshot`] from a consistent read of tasks and
//! edges, and the functions here derive critical path, float, and workload
//! without holding locks or persisting anything. A concurrent mutation may
//! make a result stale but never inconsistent: the computation always runs
//! over a graph that was acyclic at some instant.

mod cpm;
mod error;
mod snapshot;
mod workload;

pub use cpm::{critical_path, CriticalPath};
pub use error::ScheduleError;
pub use snapshot::ScheduleSnapshot;
pub use workload::{workload, DateRange, WorkloadReport, MINUTES_PER_WORKDAY};

#[cfg(test)]
mod tests;
