//! Error types for schedule computation.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned by schedule computations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The snapshot's edge set contains a cycle.
    ///
    /// Unreachable when the snapshot comes from a graph port that enforces
    /// acyclicity; snapshots assembled from other sources can still trip it.
    #[error("dependency snapshot contains a cycle")]
    CyclicGraph,

    /// The queried date range ends before it starts.
    #[error("date range ends {end} before it starts {start}")]
    EmptyRange {
        /// Requested range start.
        start: NaiveDate,
        /// Requested range end.
        end: NaiveDate,
    },
}
