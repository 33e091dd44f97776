use crate::error::AppError;
use crate::model::{Task, TaskStatus, whole_days};
use crate::store::TaskStore;
use serde::Serialize;
use time::Date;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.done
    }

    /// Share of done tasks in percent; an empty scope is 0%.
    pub fn percent_done(&self) -> f64 {
        percent(self.done, self.total())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone_id: String,
    pub name: String,
    pub counts: StatusCounts,
    pub percent_done: f64,
}

pub fn status_counts<'a, I>(tasks: I) -> StatusCounts
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .fold(StatusCounts::default(), |mut counts, task| {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
            }
            counts
        })
}

pub fn zone_progress(store: &TaskStore, zone_id: &str) -> Result<f64, AppError> {
    let zone = store.require_zone(zone_id)?;
    let counts = status_counts(store.tasks().iter().filter(|task| task.zone_id == zone.id));
    Ok(counts.percent_done())
}

pub fn overall_progress(store: &TaskStore) -> f64 {
    status_counts(store.tasks()).percent_done()
}

pub fn zone_summaries(store: &TaskStore) -> Vec<ZoneSummary> {
    store
        .zones()
        .iter()
        .map(|zone| {
            let counts =
                status_counts(store.tasks().iter().filter(|task| task.zone_id == zone.id));
            ZoneSummary {
                zone_id: zone.id.clone(),
                name: zone.name.clone(),
                counts,
                percent_done: counts.percent_done(),
            }
        })
        .collect()
}

/// Working days still ahead, counting unestimated tasks at the default effort.
pub fn remaining_effort_days(store: &TaskStore) -> f64 {
    store
        .tasks()
        .iter()
        .filter(|task| !task.is_done())
        .map(Task::effort_days)
        .sum()
}

/// Projects a finish date from the remaining effort and the hours actually
/// spent on the renovation per calendar day.
pub fn estimated_completion(
    store: &TaskStore,
    today: Date,
    workday_hours: f64,
    hours_per_day: f64,
) -> Result<Date, AppError> {
    if !(hours_per_day.is_finite() && hours_per_day > 0.0) {
        return Err(AppError::validation("hours_per_day must be positive"));
    }
    if !(workday_hours.is_finite() && workday_hours > 0.0) {
        return Err(AppError::validation("workday_hours must be positive"));
    }

    let remaining_hours = remaining_effort_days(store) * workday_hours;
    let calendar_days = (remaining_hours / hours_per_day).ceil();
    Ok(today.saturating_add(whole_days(calendar_days)))
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}
