use crate::agenda::{self, AgendaEntry};
use crate::config::Config;
use crate::error::AppError;
use crate::model::{Priority, Task, TaskStatus};
use crate::progress::{self, StatusCounts, ZoneSummary};
use crate::store::TaskStore;
use serde::Serialize;
use time::{Date, Duration};

/// How many pending tasks are suggested for the coming week.
pub const RECOMMENDED_TASKS: usize = 5;

/// Everything a front end redraws after an interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub today: Date,
    pub overall_percent: f64,
    pub counts: StatusCounts,
    pub zones: Vec<ZoneSummary>,
    pub today_tasks: Vec<Task>,
    pub agenda: Vec<AgendaEntry>,
    pub conflict_dates: Vec<Date>,
    pub remaining_effort_days: f64,
    pub estimated_completion: Option<Date>,
    pub priority_tasks: Vec<Task>,
    pub recommended: Vec<Task>,
}

/// High-priority tasks that are not done yet, in store order.
pub fn open_high_priority(store: &TaskStore) -> Vec<Task> {
    store
        .tasks()
        .iter()
        .filter(|task| task.priority == Priority::High && !task.is_done())
        .cloned()
        .collect()
}

/// Pending tasks to pick up next: most important first, then the shortest.
pub fn weekly_recommendations(store: &TaskStore) -> Vec<Task> {
    let mut pending: Vec<Task> = store
        .tasks()
        .iter()
        .filter(|task| task.status == TaskStatus::Pending)
        .cloned()
        .collect();
    pending.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.effort_days().total_cmp(&b.effort_days()))
    });
    pending.truncate(RECOMMENDED_TASKS);
    pending
}

pub struct Dashboard;

impl Dashboard {
    /// Rebuilds the whole view from the current store; `horizon_days` is the
    /// number of days after `today` covered by the agenda.
    pub fn compute(
        store: &TaskStore,
        today: Date,
        horizon_days: u32,
        config: &Config,
    ) -> Result<DashboardView, AppError> {
        let horizon_end = today.saturating_add(Duration::days(i64::from(horizon_days)));
        let counts = progress::status_counts(store.tasks());
        let remaining = progress::remaining_effort_days(store);

        let estimated_completion = if counts.total() == counts.done {
            None
        } else {
            Some(progress::estimated_completion(
                store,
                today,
                config.workday_hours(),
                config.hours_per_day(),
            )?)
        };

        Ok(DashboardView {
            today,
            overall_percent: counts.percent_done(),
            counts,
            zones: progress::zone_summaries(store),
            today_tasks: agenda::tasks_on_date(store, today),
            agenda: agenda::tasks_in_range(store, today, horizon_end)?,
            conflict_dates: agenda::conflict_dates(store, today, horizon_end),
            remaining_effort_days: remaining,
            estimated_completion,
            priority_tasks: open_high_priority(store),
            recommended: weekly_recommendations(store),
        })
    }
}
