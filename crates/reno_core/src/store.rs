//! In-memory task store.
//!
//! Zones own their tasks; every write validates first and only then
//! touches state, so a failed call leaves the store exactly as it was.

use crate::error::AppError;
use crate::model::{DEFAULT_ZONES, MAX_DURATION_DAYS, Priority, Task, TaskStatus, Zone};
use log::{debug, info};
use std::collections::HashSet;

const TASK_ID_PREFIX: &str = "T";

#[derive(Debug, Clone, PartialEq)]
pub struct TaskStore {
    zones: Vec<Zone>,
    tasks: Vec<Task>,
    next_task_number: u64,
}

/// Optional attributes for `TaskStore::add_task`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub id: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub duration_days: Option<f64>,
}

/// Field changes for `TaskStore::edit_task`; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEdit {
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub duration_days: Option<f64>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            zones: Vec::new(),
            tasks: Vec::new(),
            next_task_number: 1,
        }
    }

    pub fn with_default_zones() -> Self {
        let mut store = Self::new();
        store.zones = DEFAULT_ZONES
            .iter()
            .map(|(id, name)| Zone::new(*id, *name))
            .collect();
        store
    }

    /// Rebuilds a store from persisted parts, rejecting broken references.
    pub fn from_parts(
        zones: Vec<Zone>,
        tasks: Vec<Task>,
        next_task_number: u64,
    ) -> Result<Self, AppError> {
        let mut zone_ids = HashSet::new();
        for zone in &zones {
            if zone.id.trim().is_empty() {
                return Err(AppError::invalid_data("zone id is empty"));
            }
            if !zone_ids.insert(zone.id.as_str()) {
                return Err(AppError::invalid_data(format!(
                    "duplicate zone id '{}'",
                    zone.id
                )));
            }
        }

        let mut task_ids = HashSet::new();
        for task in &tasks {
            if !task_ids.insert(task.id.as_str()) {
                return Err(AppError::invalid_data(format!(
                    "duplicate task id '{}'",
                    task.id
                )));
            }
            if !zone_ids.contains(task.zone_id.as_str()) {
                return Err(AppError::invalid_data(format!(
                    "task '{}' references unknown zone '{}'",
                    task.id, task.zone_id
                )));
            }
        }

        let mut listed = HashSet::new();
        for zone in &zones {
            for task_id in &zone.tasks {
                let owned = tasks
                    .iter()
                    .any(|task| &task.id == task_id && task.zone_id == zone.id);
                if !owned || !listed.insert(task_id.as_str()) {
                    return Err(AppError::invalid_data(format!(
                        "zone '{}' lists task '{}' it does not own",
                        zone.id, task_id
                    )));
                }
            }
        }
        if listed.len() != tasks.len() {
            return Err(AppError::invalid_data("task missing from its zone list"));
        }

        let highest = tasks
            .iter()
            .filter_map(|task| generated_number(&task.id))
            .max()
            .unwrap_or(0);

        Ok(Self {
            zones,
            tasks,
            next_task_number: next_task_number.max(highest.saturating_add(1)),
        })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn next_task_number(&self) -> u64 {
        self.next_task_number
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        let id = id.trim();
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        let id = id.trim();
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn require_zone(&self, id: &str) -> Result<&Zone, AppError> {
        self.zone(id)
            .ok_or_else(|| AppError::not_found(format!("zone not found: {}", id.trim())))
    }

    pub fn require_task(&self, id: &str) -> Result<&Task, AppError> {
        self.task(id)
            .ok_or_else(|| AppError::not_found(format!("task not found: {}", id.trim())))
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Result<&mut Task, AppError> {
        let id = id.trim();
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(format!("task not found: {id}")))
    }

    pub fn add_zone(&mut self, id: &str, name: &str) -> Result<Zone, AppError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(AppError::validation("zone id is required"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("zone name is required"));
        }
        if self.zone(id).is_some() {
            return Err(AppError::validation(format!("zone already exists: {id}")));
        }

        let zone = Zone::new(id, name);
        self.zones.push(zone.clone());
        info!("event=zone_add module=store status=ok zone={id}");
        Ok(zone)
    }

    /// Removes a zone together with every task it owns.
    pub fn remove_zone(&mut self, id: &str) -> Result<Zone, AppError> {
        let id = id.trim();
        let index = self
            .zones
            .iter()
            .position(|zone| zone.id == id)
            .ok_or_else(|| AppError::not_found(format!("zone not found: {id}")))?;

        let removed = self.zones.remove(index);
        self.tasks.retain(|task| task.zone_id != removed.id);
        info!(
            "event=zone_remove module=store status=ok zone={} tasks={}",
            removed.id,
            removed.tasks.len()
        );
        Ok(removed)
    }

    pub fn add_task(
        &mut self,
        zone_id: &str,
        description: &str,
        options: NewTask,
    ) -> Result<Task, AppError> {
        let zone_id = self.require_zone(zone_id)?.id.clone();

        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::validation("description is required"));
        }
        validate_duration(options.duration_days)?;

        let explicit_id = match options.id.as_deref().map(str::trim) {
            Some("") => return Err(AppError::validation("task id cannot be blank")),
            Some(id) => {
                if self.task(id).is_some() {
                    return Err(AppError::validation(format!("task already exists: {id}")));
                }
                Some(id.to_string())
            }
            None => None,
        };

        let id = match explicit_id {
            Some(id) => id,
            None => self.allocate_task_id()?,
        };

        let task = Task {
            id: id.clone(),
            zone_id: zone_id.clone(),
            description: description.to_string(),
            status: options.status,
            priority: options.priority,
            scheduled_on: None,
            duration_days: options.duration_days,
        };

        self.tasks.push(task.clone());
        if let Some(zone) = self.zones.iter_mut().find(|zone| zone.id == zone_id) {
            zone.tasks.push(id.clone());
        }
        info!("event=task_add module=store status=ok id={id} zone={zone_id}");
        Ok(task)
    }

    pub fn edit_task(&mut self, id: &str, edit: TaskEdit) -> Result<Task, AppError> {
        let description = match edit.description.as_deref().map(str::trim) {
            Some("") => return Err(AppError::validation("description is required")),
            Some(value) => Some(value.to_string()),
            None => None,
        };
        validate_duration(edit.duration_days)?;

        let task = self.task_mut(id)?;
        if let Some(description) = description {
            task.description = description;
        }
        if let Some(priority) = edit.priority {
            task.priority = priority;
        }
        if let Some(duration_days) = edit.duration_days {
            task.duration_days = Some(duration_days);
        }

        debug!("event=task_edit module=store status=ok id={}", task.id);
        Ok(task.clone())
    }

    /// Moves a task to `status`. Backward moves need `force`.
    pub fn update_status(
        &mut self,
        id: &str,
        status: TaskStatus,
        force: bool,
    ) -> Result<Task, AppError> {
        let task = self.task_mut(id)?;
        if !force && !task.status.can_advance_to(status) {
            return Err(AppError::validation(format!(
                "cannot move task {} from {} back to {} without --force",
                task.id, task.status, status
            )));
        }

        let previous = task.status;
        task.status = status;
        info!(
            "event=task_status module=store status=ok id={} from={:?} to={:?}",
            task.id, previous, status
        );
        Ok(task.clone())
    }

    pub fn list_by_zone(&self, zone_id: &str) -> Result<Vec<Task>, AppError> {
        let zone = self.require_zone(zone_id)?;
        Ok(zone
            .tasks
            .iter()
            .filter_map(|task_id| self.task(task_id).cloned())
            .collect())
    }

    pub fn remove_task(&mut self, id: &str) -> Result<Task, AppError> {
        let id = id.trim();
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(format!("task not found: {id}")))?;

        let removed = self.tasks.remove(index);
        if let Some(zone) = self.zones.iter_mut().find(|zone| zone.id == removed.zone_id) {
            zone.tasks.retain(|task_id| task_id != &removed.id);
        }
        info!("event=task_remove module=store status=ok id={id}");
        Ok(removed)
    }

    /// Drops every task and restores the stock zone list.
    pub fn reset_to_default_zones(&mut self) {
        *self = Self::with_default_zones();
        info!("event=store_reset module=store status=ok");
    }

    /// The counter only moves once a free id is found.
    fn allocate_task_id(&mut self) -> Result<String, AppError> {
        let mut number = self.next_task_number;
        loop {
            let candidate = format!("{TASK_ID_PREFIX}{number}");
            let next = number.checked_add(1).ok_or_else(|| {
                AppError::validation("no generated task ids left; pass an explicit id")
            })?;
            if self.task(&candidate).is_none() {
                self.next_task_number = next;
                return Ok(candidate);
            }
            number = next;
        }
    }
}

pub(crate) fn validate_duration(duration_days: Option<f64>) -> Result<(), AppError> {
    match duration_days {
        Some(days) if !days.is_finite() || days <= 0.0 || days > MAX_DURATION_DAYS => {
            Err(AppError::validation(format!(
                "duration must be a positive number of days, at most {MAX_DURATION_DAYS}"
            )))
        }
        _ => Ok(()),
    }
}

fn generated_number(id: &str) -> Option<u64> {
    id.strip_prefix(TASK_ID_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{NewTask, TaskEdit, TaskStore};
    use crate::model::{Priority, Task, TaskStatus, Zone};

    fn kitchen_store() -> TaskStore {
        let mut store = TaskStore::new();
        store.add_zone("kitchen", "Kitchen").unwrap();
        store
    }

    #[test]
    fn add_task_generates_sequential_ids() {
        let mut store = kitchen_store();
        let first = store.add_task("kitchen", "strip wallpaper", NewTask::default()).unwrap();
        let second = store.add_task("kitchen", "paint walls", NewTask::default()).unwrap();

        assert_eq!(first.id, "T1");
        assert_eq!(second.id, "T2");
        assert_eq!(first.status, TaskStatus::Pending);
        assert_eq!(first.priority, Priority::Medium);
        assert_eq!(store.zone("kitchen").unwrap().tasks, vec!["T1", "T2"]);
    }

    #[test]
    fn add_task_skips_ids_taken_explicitly() {
        let mut store = kitchen_store();
        store
            .add_task(
                "kitchen",
                "fit sink",
                NewTask {
                    id: Some("T1".into()),
                    ..NewTask::default()
                },
            )
            .unwrap();
        let generated = store.add_task("kitchen", "fit tap", NewTask::default()).unwrap();

        assert_eq!(generated.id, "T2");
    }

    #[test]
    fn add_task_rejects_unknown_zone() {
        let mut store = kitchen_store();
        let err = store.add_task("attic", "insulate", NewTask::default()).unwrap_err();

        assert_eq!(err.code(), "not_found");
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn add_task_rejects_blank_description() {
        let mut store = kitchen_store();
        let err = store.add_task("kitchen", "   ", NewTask::default()).unwrap_err();

        assert_eq!(err.code(), "validation_error");
        assert_eq!(store.next_task_number(), 1);
    }

    #[test]
    fn add_task_rejects_duplicate_id() {
        let mut store = kitchen_store();
        let options = NewTask {
            id: Some("sink".into()),
            ..NewTask::default()
        };
        store.add_task("kitchen", "fit sink", options.clone()).unwrap();
        let err = store.add_task("kitchen", "fit sink again", options).unwrap_err();

        assert_eq!(err.code(), "validation_error");
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn add_task_rejects_non_positive_duration() {
        let mut store = kitchen_store();
        let err = store
            .add_task(
                "kitchen",
                "grout",
                NewTask {
                    duration_days: Some(0.0),
                    ..NewTask::default()
                },
            )
            .unwrap_err();

        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn add_task_rejects_duration_beyond_limit() {
        let mut store = kitchen_store();
        let err = store
            .add_task(
                "kitchen",
                "rebuild",
                NewTask {
                    duration_days: Some(1e15),
                    ..NewTask::default()
                },
            )
            .unwrap_err();

        assert_eq!(err.code(), "validation_error");
        assert!(store.tasks().is_empty());

        let longest = store
            .add_task(
                "kitchen",
                "rebuild slowly",
                NewTask {
                    duration_days: Some(36_500.0),
                    ..NewTask::default()
                },
            )
            .unwrap();
        assert_eq!(longest.duration_days, Some(36_500.0));
    }

    #[test]
    fn add_zone_rejects_duplicates_and_blanks() {
        let mut store = kitchen_store();

        assert_eq!(store.add_zone("kitchen", "Other").unwrap_err().code(), "validation_error");
        assert_eq!(store.add_zone(" ", "Blank").unwrap_err().code(), "validation_error");
        assert_eq!(store.add_zone("hall", " ").unwrap_err().code(), "validation_error");
        assert_eq!(store.zones().len(), 1);
    }

    #[test]
    fn update_status_moves_forward() {
        let mut store = kitchen_store();
        store.add_task("kitchen", "paint", NewTask::default()).unwrap();

        let started = store.update_status("T1", TaskStatus::InProgress, false).unwrap();
        assert_eq!(started.status, TaskStatus::InProgress);

        let done = store.update_status("T1", TaskStatus::Done, false).unwrap();
        assert_eq!(done.status, TaskStatus::Done);
    }

    #[test]
    fn update_status_rejects_backward_move_and_keeps_status() {
        let mut store = kitchen_store();
        store.add_task("kitchen", "paint", NewTask::default()).unwrap();
        store.update_status("T1", TaskStatus::Done, false).unwrap();

        let err = store.update_status("T1", TaskStatus::Pending, false).unwrap_err();

        assert_eq!(err.code(), "validation_error");
        assert_eq!(store.task("T1").unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn update_status_with_force_allows_backward_move() {
        let mut store = kitchen_store();
        store.add_task("kitchen", "paint", NewTask::default()).unwrap();
        store.update_status("T1", TaskStatus::Done, false).unwrap();

        let reopened = store.update_status("T1", TaskStatus::InProgress, true).unwrap();
        assert_eq!(reopened.status, TaskStatus::InProgress);
    }

    #[test]
    fn update_status_reports_missing_task() {
        let mut store = kitchen_store();
        let err = store.update_status("T9", TaskStatus::Done, false).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn list_by_zone_keeps_zone_order() {
        let mut store = kitchen_store();
        store.add_zone("hall", "Hall").unwrap();
        store.add_task("kitchen", "a", NewTask::default()).unwrap();
        store.add_task("hall", "b", NewTask::default()).unwrap();
        store.add_task("kitchen", "c", NewTask::default()).unwrap();

        let kitchen: Vec<String> = store
            .list_by_zone("kitchen")
            .unwrap()
            .into_iter()
            .map(|task| task.description)
            .collect();
        assert_eq!(kitchen, vec!["a", "c"]);
        assert_eq!(store.list_by_zone("attic").unwrap_err().code(), "not_found");
    }

    #[test]
    fn remove_task_detaches_from_zone() {
        let mut store = kitchen_store();
        store.add_task("kitchen", "a", NewTask::default()).unwrap();
        store.add_task("kitchen", "b", NewTask::default()).unwrap();

        let removed = store.remove_task("T1").unwrap();

        assert_eq!(removed.description, "a");
        assert_eq!(store.zone("kitchen").unwrap().tasks, vec!["T2"]);
        assert_eq!(store.remove_task("T1").unwrap_err().code(), "not_found");
    }

    #[test]
    fn remove_zone_drops_its_tasks() {
        let mut store = kitchen_store();
        store.add_zone("hall", "Hall").unwrap();
        store.add_task("kitchen", "a", NewTask::default()).unwrap();
        store.add_task("hall", "b", NewTask::default()).unwrap();

        store.remove_zone("kitchen").unwrap();

        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].zone_id, "hall");
    }

    #[test]
    fn edit_task_is_all_or_nothing() {
        let mut store = kitchen_store();
        store.add_task("kitchen", "paint", NewTask::default()).unwrap();

        let err = store
            .edit_task(
                "T1",
                TaskEdit {
                    description: Some("repaint".into()),
                    duration_days: Some(-1.0),
                    ..TaskEdit::default()
                },
            )
            .unwrap_err();

        assert_eq!(err.code(), "validation_error");
        assert_eq!(store.task("T1").unwrap().description, "paint");

        let edited = store
            .edit_task(
                "T1",
                TaskEdit {
                    priority: Some(Priority::High),
                    duration_days: Some(2.0),
                    ..TaskEdit::default()
                },
            )
            .unwrap();
        assert_eq!(edited.priority, Priority::High);
        assert_eq!(edited.duration_days, Some(2.0));
        assert_eq!(edited.description, "paint");
    }

    #[test]
    fn reset_restores_default_zones() {
        let mut store = kitchen_store();
        store.add_task("kitchen", "a", NewTask::default()).unwrap();

        store.reset_to_default_zones();

        assert!(store.tasks().is_empty());
        assert_eq!(store.zones().len(), 4);
        assert!(store.zone("staircase").is_some());
    }

    #[test]
    fn from_parts_rejects_task_with_unknown_zone() {
        let task = Task {
            id: "T1".into(),
            zone_id: "attic".into(),
            description: "insulate".into(),
            status: TaskStatus::Pending,
            priority: Priority::Low,
            scheduled_on: None,
            duration_days: None,
        };

        let err = TaskStore::from_parts(vec![Zone::new("kitchen", "Kitchen")], vec![task], 1)
            .unwrap_err();
        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn from_parts_advances_counter_past_existing_ids() {
        let mut zone = Zone::new("kitchen", "Kitchen");
        zone.tasks.push("T7".into());
        let task = Task {
            id: "T7".into(),
            zone_id: "kitchen".into(),
            description: "tile".into(),
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            scheduled_on: None,
            duration_days: None,
        };

        let store = TaskStore::from_parts(vec![zone], vec![task], 1).unwrap();
        assert_eq!(store.next_task_number(), 8);
    }

    #[test]
    fn from_parts_accepts_highest_possible_id() {
        let mut store = kitchen_store();
        store
            .add_task(
                "kitchen",
                "last",
                NewTask {
                    id: Some(format!("T{}", u64::MAX)),
                    ..NewTask::default()
                },
            )
            .unwrap();

        let reloaded = TaskStore::from_parts(
            store.zones().to_vec(),
            store.tasks().to_vec(),
            store.next_task_number(),
        )
        .unwrap();
        assert_eq!(reloaded.next_task_number(), u64::MAX);
    }

    #[test]
    fn exhausted_counter_rejects_generated_id_but_keeps_explicit_ones() {
        let mut zone = Zone::new("kitchen", "Kitchen");
        zone.tasks.push(format!("T{}", u64::MAX));
        let task = Task {
            id: format!("T{}", u64::MAX),
            zone_id: "kitchen".into(),
            description: "last".into(),
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            scheduled_on: None,
            duration_days: None,
        };
        let mut store = TaskStore::from_parts(vec![zone], vec![task], 1).unwrap();

        let err = store.add_task("kitchen", "one more", NewTask::default()).unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.next_task_number(), u64::MAX);

        let named = store
            .add_task(
                "kitchen",
                "one more",
                NewTask {
                    id: Some("extra".into()),
                    ..NewTask::default()
                },
            )
            .unwrap();
        assert_eq!(named.id, "extra");
    }
}
