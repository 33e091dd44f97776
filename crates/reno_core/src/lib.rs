pub mod agenda;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod model;
pub mod progress;
pub mod storage;
pub mod store;
pub mod task_api;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Priority, Task, TaskStatus};

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: "T1".to_string(),
            zone_id: "kitchen".to_string(),
            description: "demo".to_string(),
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            scheduled_on: None,
            duration_days: None,
        };

        assert_eq!(task.id, "T1");
        assert_eq!(task.zone_id, "kitchen");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.is_done());
        assert_eq!(task.effort_days(), 1.0);
        assert_eq!(task.end_date(), None);
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::not_found("task not found: T1");
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.to_string(), "not_found - task not found: T1");
        assert!(err.is_user_error());
        assert!(!AppError::io("disk full").is_user_error());
    }
}
