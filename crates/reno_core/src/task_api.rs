use crate::agenda::{self, AgendaEntry};
use crate::config::Config;
use crate::dashboard::{Dashboard, DashboardView};
use crate::error::AppError;
use crate::model::{Priority, Task, TaskStatus, Zone, canonical_key};
use crate::progress::{self, ZoneSummary};
use crate::storage::json_store;
use crate::store::{NewTask, TaskEdit, TaskStore};
use serde::Serialize;
use std::cmp::Reverse;
use std::path::Path;
use std::str::FromStr;
use time::Date;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub overall_percent: f64,
    pub zones: Vec<ZoneSummary>,
}

/// Ordering for `list`. Sorting is stable, so ties keep zone order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSort {
    /// Most important first.
    PriorityDesc,
    PriorityAsc,
    /// Longest estimate first.
    DurationDesc,
    DurationAsc,
}

impl FromStr for TaskSort {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical_key(raw).as_str() {
            "priority" | "priority_desc" => Ok(Self::PriorityDesc),
            "priority_asc" => Ok(Self::PriorityAsc),
            "duration" | "duration_desc" => Ok(Self::DurationDesc),
            "duration_asc" => Ok(Self::DurationAsc),
            _ => Err(AppError::validation(format!(
                "unknown sort '{}' (expected priority, priority-asc, duration or duration-asc)",
                raw.trim()
            ))),
        }
    }
}

/// Restricts a task list; an empty set accepts every value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub statuses: Vec<TaskStatus>,
    pub priorities: Vec<Priority>,
    pub sort: Option<TaskSort>,
}

impl TaskFilter {
    fn accepts(&self, task: &Task) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&task.status))
            && (self.priorities.is_empty() || self.priorities.contains(&task.priority))
    }
}

pub fn select_tasks(tasks: Vec<Task>, filter: &TaskFilter) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks
        .into_iter()
        .filter(|task| filter.accepts(task))
        .collect();

    match filter.sort {
        Some(TaskSort::PriorityDesc) => selected.sort_by_key(|task| task.priority),
        Some(TaskSort::PriorityAsc) => selected.sort_by_key(|task| Reverse(task.priority)),
        Some(TaskSort::DurationDesc) => {
            selected.sort_by(|a, b| b.effort_days().total_cmp(&a.effort_days()))
        }
        Some(TaskSort::DurationAsc) => {
            selected.sort_by(|a, b| a.effort_days().total_cmp(&b.effort_days()))
        }
        None => {}
    }
    selected
}

pub fn add_zone(id: &str, name: &str) -> Result<Zone, AppError> {
    let path = json_store::store_path()?;
    add_zone_with_path(&path, id, name)
}

pub fn remove_zone(id: &str) -> Result<Zone, AppError> {
    let path = json_store::store_path()?;
    remove_zone_with_path(&path, id)
}

pub fn list_zones() -> Result<Vec<Zone>, AppError> {
    let path = json_store::store_path()?;
    Ok(json_store::load_store(&path)?.zones().to_vec())
}

pub fn add_task(zone_id: &str, description: &str, options: NewTask) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, zone_id, description, options)
}

pub fn edit_task(id: &str, edit: TaskEdit) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    edit_task_with_path(&path, id, edit)
}

pub fn remove_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    remove_task_with_path(&path, id)
}

/// Tasks of one zone, or of every zone in zone order when `zone_id` is `None`,
/// narrowed and ordered by `filter`.
pub fn list_tasks(zone_id: Option<&str>, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    list_tasks_with_path(&path, zone_id, filter)
}

pub fn set_status(id: &str, status: TaskStatus, force: bool) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    set_status_with_path(&path, id, status, force)
}

pub fn schedule_task(
    id: &str,
    date: &str,
    duration_days: Option<f64>,
    today: Date,
) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    schedule_task_with_path(&path, id, date, duration_days, today)
}

pub fn unschedule_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    unschedule_task_with_path(&path, id)
}

pub fn progress_report(zone_id: Option<&str>) -> Result<ProgressReport, AppError> {
    let path = json_store::store_path()?;
    progress_report_with_path(&path, zone_id)
}

pub fn agenda(start: Date, end: Date) -> Result<Vec<AgendaEntry>, AppError> {
    let path = json_store::store_path()?;
    let store = json_store::load_store(&path)?;
    agenda::tasks_in_range(&store, start, end)
}

pub fn conflicts(date: Date) -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    let store = json_store::load_store(&path)?;
    Ok(agenda::conflicts(&store, date))
}

pub fn dashboard(today: Date, config: &Config) -> Result<DashboardView, AppError> {
    let path = json_store::store_path()?;
    let store = json_store::load_store(&path)?;
    Dashboard::compute(&store, today, config.agenda_days(), config)
}

pub fn reset() -> Result<TaskStore, AppError> {
    let path = json_store::store_path()?;
    reset_with_path(&path)
}

/// Loads, applies `change`, and saves only if `change` succeeded.
fn mutate_store<T>(
    path: &Path,
    change: impl FnOnce(&mut TaskStore) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut store = json_store::load_store(path)?;
    let value = change(&mut store)?;
    json_store::save_store(path, &store)?;
    Ok(value)
}

fn add_zone_with_path(path: &Path, id: &str, name: &str) -> Result<Zone, AppError> {
    mutate_store(path, |store| store.add_zone(id, name))
}

fn remove_zone_with_path(path: &Path, id: &str) -> Result<Zone, AppError> {
    mutate_store(path, |store| store.remove_zone(id))
}

fn add_task_with_path(
    path: &Path,
    zone_id: &str,
    description: &str,
    options: NewTask,
) -> Result<Task, AppError> {
    mutate_store(path, |store| store.add_task(zone_id, description, options))
}

fn edit_task_with_path(path: &Path, id: &str, edit: TaskEdit) -> Result<Task, AppError> {
    mutate_store(path, |store| store.edit_task(id, edit))
}

fn remove_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    mutate_store(path, |store| store.remove_task(id))
}

fn list_tasks_with_path(
    path: &Path,
    zone_id: Option<&str>,
    filter: &TaskFilter,
) -> Result<Vec<Task>, AppError> {
    let store = json_store::load_store(path)?;
    let tasks = match zone_id {
        Some(zone_id) => store.list_by_zone(zone_id)?,
        None => {
            let mut tasks = Vec::with_capacity(store.tasks().len());
            for zone in store.zones() {
                tasks.extend(store.list_by_zone(&zone.id)?);
            }
            tasks
        }
    };
    Ok(select_tasks(tasks, filter))
}

fn set_status_with_path(
    path: &Path,
    id: &str,
    status: TaskStatus,
    force: bool,
) -> Result<Task, AppError> {
    mutate_store(path, |store| store.update_status(id, status, force))
}

fn schedule_task_with_path(
    path: &Path,
    id: &str,
    date: &str,
    duration_days: Option<f64>,
    today: Date,
) -> Result<Task, AppError> {
    mutate_store(path, |store| {
        agenda::schedule_task(store, id, date, duration_days, today)
    })
}

fn unschedule_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    mutate_store(path, |store| agenda::unschedule_task(store, id))
}

fn progress_report_with_path(
    path: &Path,
    zone_id: Option<&str>,
) -> Result<ProgressReport, AppError> {
    let store = json_store::load_store(path)?;
    let zones = match zone_id {
        Some(zone_id) => {
            let zone_id = store.require_zone(zone_id)?.id.clone();
            progress::zone_summaries(&store)
                .into_iter()
                .filter(|summary| summary.zone_id == zone_id)
                .collect()
        }
        None => progress::zone_summaries(&store),
    };

    Ok(ProgressReport {
        overall_percent: progress::overall_progress(&store),
        zones,
    })
}

fn reset_with_path(path: &Path) -> Result<TaskStore, AppError> {
    mutate_store(path, |store| {
        store.reset_to_default_zones();
        Ok(store.clone())
    })
}
