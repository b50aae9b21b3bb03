//! Workload derivation from assignments and task spans.

use crate::schedule::ScheduleError;
use crate::task::domain::{AllocationPercent, Task, TaskAssignment, TaskId};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Minutes in one working day.
pub const MINUTES_PER_WORKDAY: u32 = 480;

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EmptyRange`] when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScheduleError> {
        if end < start {
            return Err(ScheduleError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the first day of the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the range.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Intersects with another inclusive span, if they overlap.
    fn intersect(&self, start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let overlap_start = self.start.max(start);
        let overlap_end = self.end.min(end);
        (overlap_start <= overlap_end).then_some((overlap_start, overlap_end))
    }
}

/// Aggregated workload for one user over a queried range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadReport {
    /// Allocated minutes per calendar day, sparse.
    pub minutes_by_day: BTreeMap<NaiveDate, u32>,
    /// Sum of all per-day minutes.
    pub total_minutes: u64,
}

/// Sums a user's active assignments over the queried range.
///
/// Each assignment contributes `allocation% × MINUTES_PER_WORKDAY` for
/// every day in the intersection of the task's estimated span with the
/// range. Assignments on tasks missing either estimated date (milestones)
/// and inactive assignments contribute nothing.
#[must_use]
pub fn workload(
    assignments: &[TaskAssignment],
    tasks: &[Task],
    range: &DateRange,
) -> WorkloadReport {
    let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id(), t)).collect();
    let mut report = WorkloadReport::default();

    for assignment in assignments.iter().filter(|a| a.is_active()) {
        let Some(task) = by_id.get(&assignment.task_id()) else {
            continue;
        };
        if task.is_deleted() {
            continue;
        }
        let (Some(span_start), Some(span_end)) =
            (task.estimated_start_date(), task.estimated_end_date())
        else {
            continue;
        };
        let Some((overlap_start, overlap_end)) = range.intersect(span_start, span_end) else {
            continue;
        };

        let per_day = daily_minutes(assignment.allocation());
        for day in overlap_start
            .iter_days()
            .take_while(|day| *day <= overlap_end)
        {
            *report.minutes_by_day.entry(day).or_insert(0) += per_day;
            report.total_minutes += u64::from(per_day);
        }
    }

    report
}

/// Whole minutes one assignment contributes per overlapping day.
#[expect(
    clippy::integer_division,
    reason = "contributions are truncated to whole minutes"
)]
fn daily_minutes(allocation: AllocationPercent) -> u32 {
    u32::from(allocation.value()) * MINUTES_PER_WORKDAY / 100
}
