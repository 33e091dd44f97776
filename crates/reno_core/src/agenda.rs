//! Calendar projection over the task store.
//!
//! Nothing here is stored: agenda entries are rebuilt from each task's
//! `scheduled_on` date on every call. Several tasks may share a day; such
//! overlaps are reported, never rejected.

use crate::error::AppError;
use crate::model::Task;
use crate::store::{TaskStore, validate_duration};
use log::info;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaEntry {
    pub date: Date,
    /// Last day the task occupies, inclusive.
    pub end: Date,
    pub zone_name: String,
    pub task: Task,
}

pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_date("date is required"));
    }
    Date::parse(trimmed, DATE_FORMAT)
        .map_err(|_| AppError::invalid_date(format!("date must be YYYY-MM-DD, got '{trimmed}'")))
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// The reference "today": an explicit `YYYY-MM-DD` value wins over the
/// local calendar date.
pub fn resolve_today(configured: Option<&str>) -> Result<Date, AppError> {
    match configured.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date(value),
        None => {
            let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
            Ok(OffsetDateTime::now_utc().to_offset(offset).date())
        }
    }
}

/// Monday through Sunday of the week containing `date`.
pub fn week_of(date: Date) -> (Date, Date) {
    let offset = i64::from(date.weekday().number_days_from_monday());
    let monday = date.saturating_sub(Duration::days(offset));
    (monday, monday.saturating_add(Duration::days(6)))
}

pub fn schedule_task(
    store: &mut TaskStore,
    id: &str,
    raw_date: &str,
    duration_days: Option<f64>,
    today: Date,
) -> Result<Task, AppError> {
    let date = parse_date(raw_date)?;
    store.require_task(id)?;
    if date < today {
        return Err(AppError::invalid_date(format!(
            "{} is before today ({})",
            format_date(date),
            format_date(today)
        )));
    }
    validate_duration(duration_days)?;

    let task = store.task_mut(id)?;
    task.scheduled_on = Some(date);
    if duration_days.is_some() {
        task.duration_days = duration_days;
    }

    info!(
        "event=task_schedule module=agenda status=ok id={} date={}",
        task.id,
        format_date(date)
    );
    Ok(task.clone())
}

pub fn unschedule_task(store: &mut TaskStore, id: &str) -> Result<Task, AppError> {
    let task = store.task_mut(id)?;
    task.scheduled_on = None;
    info!("event=task_unschedule module=agenda status=ok id={}", task.id);
    Ok(task.clone())
}

pub fn tasks_on_date(store: &TaskStore, date: Date) -> Vec<Task> {
    let mut tasks: Vec<Task> = store
        .tasks()
        .iter()
        .filter(|task| task.scheduled_on == Some(date))
        .cloned()
        .collect();
    tasks.sort_by(|left, right| compare_ids(&left.id, &right.id));
    tasks
}

/// Scheduled tasks with `start <= date <= end`, ordered by date then id.
pub fn tasks_in_range(
    store: &TaskStore,
    start: Date,
    end: Date,
) -> Result<Vec<AgendaEntry>, AppError> {
    if start > end {
        return Err(AppError::invalid_date(format!(
            "range start {} is after end {}",
            format_date(start),
            format_date(end)
        )));
    }

    let mut entries: Vec<AgendaEntry> = store
        .tasks()
        .iter()
        .filter_map(|task| {
            let date = task.scheduled_on?;
            if date < start || date > end {
                return None;
            }
            let zone_name = store
                .zone(&task.zone_id)
                .map(|zone| zone.name.clone())
                .unwrap_or_else(|| task.zone_id.clone());
            Some(AgendaEntry {
                date,
                end: task.end_date().unwrap_or(date),
                zone_name,
                task: task.clone(),
            })
        })
        .collect();

    entries.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then_with(|| compare_ids(&left.task.id, &right.task.id))
    });
    Ok(entries)
}

/// Tasks sharing `date`, or nothing when the day holds at most one task.
pub fn conflicts(store: &TaskStore, date: Date) -> Vec<Task> {
    let tasks = tasks_on_date(store, date);
    if tasks.len() > 1 { tasks } else { Vec::new() }
}

pub fn conflict_dates(store: &TaskStore, start: Date, end: Date) -> Vec<Date> {
    let mut per_day: BTreeMap<Date, usize> = BTreeMap::new();
    for date in store.tasks().iter().filter_map(|task| task.scheduled_on) {
        if date >= start && date <= end {
            *per_day.entry(date).or_default() += 1;
        }
    }
    per_day
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(date, _)| date)
        .collect()
}

/// Orders `T2` before `T10`; ids without a numeric suffix sort by text.
pub fn compare_ids(left: &str, right: &str) -> Ordering {
    id_sort_key(left).cmp(&id_sort_key(right))
}

fn id_sort_key(id: &str) -> (&str, Option<u64>, &str) {
    let prefix_len = id.trim_end_matches(|ch: char| ch.is_ascii_digit()).len();
    let (prefix, digits) = id.split_at(prefix_len);
    (prefix, digits.parse().ok(), id)
}
