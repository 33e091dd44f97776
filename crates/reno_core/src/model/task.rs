use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, Duration};

/// Effort assumed for a task that carries no estimate.
pub const DEFAULT_DURATION_DAYS: f64 = 1.0;

/// Largest estimate accepted for one task (about a century).
pub const MAX_DURATION_DAYS: f64 = 36_500.0;

// Past the whole calendar range of `Date`, so adding it always saturates.
const MAX_SPAN_DAYS: f64 = 10_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub zone_id: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub scheduled_on: Option<Date>,
    #[serde(default)]
    pub duration_days: Option<f64>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn effort_days(&self) -> f64 {
        self.duration_days.unwrap_or(DEFAULT_DURATION_DAYS)
    }

    /// Last calendar day the task occupies, inclusive.
    pub fn end_date(&self) -> Option<Date> {
        let start = self.scheduled_on?;
        let span = self.duration_days.map(|days| days.ceil() - 1.0).unwrap_or(0.0);
        Some(start.saturating_add(whole_days(span)))
    }
}

/// Converts a day count into a `Duration` that never overflows; negative
/// and NaN counts become zero.
pub fn whole_days(days: f64) -> Duration {
    Duration::days(days.clamp(0.0, MAX_SPAN_DAYS) as i64)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Pending, Self::InProgress, Self::Done];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Done => "done",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }

    /// Forward moves (including skipping a step) and no-op moves are allowed.
    pub fn can_advance_to(self, next: TaskStatus) -> bool {
        next.rank() >= self.rank()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical_key(raw).as_str() {
            "pending" | "todo" | "to_do" => Ok(Self::Pending),
            "in_progress" | "inprogress" | "started" | "doing" => Ok(Self::InProgress),
            "done" | "completed" | "finished" => Ok(Self::Done),
            _ => Err(AppError::validation(format!(
                "unknown status '{}' (expected pending, in-progress or done)",
                raw.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    Minimal,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical_key(raw).as_str() {
            "high" | "urgent" => Ok(Self::High),
            "medium" | "normal" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "minimal" | "lowest" => Ok(Self::Minimal),
            _ => Err(AppError::validation(format!(
                "unknown priority '{}' (expected high, medium, low or minimal)",
                raw.trim()
            ))),
        }
    }
}

/// Lowercases `raw` and collapses every run of non-alphanumerics into one
/// `_`, so `In-Progress`, `in progress` and `IN_PROGRESS` compare equal.
pub fn canonical_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}
