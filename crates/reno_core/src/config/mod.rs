//! User configuration: an optional JSON file, `RENO_TODAY`, then
//! command-line overrides.

use crate::error::AppError;
use crate::model::{TaskStatus, canonical_key};
use crate::storage;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "RENO_CONFIG_PATH";
const TODAY_ENV_VAR: &str = "RENO_TODAY";
const ANSI_RESET: &str = "\x1b[0m";

pub const DEFAULT_HOURS_PER_DAY: f64 = 3.0;
pub const DEFAULT_WORKDAY_HOURS: f64 = 8.0;
pub const DEFAULT_AGENDA_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Plain,
    Noir,
    Solarized,
}

impl Theme {
    /// Accepts the theme names plus a few aliases (`dark`, `light`, ...).
    pub fn from_name(raw: &str) -> Option<Self> {
        match canonical_key(raw).as_str() {
            "" | "plain" | "default" | "vanilla" | "light" => Some(Self::Plain),
            "noir" | "dark" | "dark_mode" | "darkmode" => Some(Self::Noir),
            "solarized" => Some(Self::Solarized),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Noir => "noir",
            Self::Solarized => "solarized",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Plain => Palette::default(),
            Self::Noir => Palette {
                highlight: "\x1b[38;5;208m",
                dim: "\x1b[38;5;250m",
            },
            Self::Solarized => Palette {
                highlight: "\x1b[38;5;108m",
                dim: "\x1b[38;5;246m",
            },
        }
    }
}

/// ANSI colours for terminal output; empty codes print plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    pub highlight: &'static str,
    pub dim: &'static str,
}

impl Palette {
    fn paint(code: &str, text: &str) -> String {
        if code.is_empty() {
            text.to_string()
        } else {
            format!("{code}{text}{ANSI_RESET}")
        }
    }

    pub fn highlight(&self, text: &str) -> String {
        Self::paint(self.highlight, text)
    }

    pub fn dim(&self, text: &str) -> String {
        Self::paint(self.dim, text)
    }

    pub fn status(&self, status: TaskStatus) -> String {
        match status {
            TaskStatus::Done => self.highlight(status.label()),
            TaskStatus::InProgress => status.label().to_string(),
            TaskStatus::Pending => self.dim(status.label()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Option<String>,
    /// Fixed reference date (`YYYY-MM-DD`) used instead of the clock.
    pub today: Option<String>,
    /// Hours per calendar day actually spent on the renovation.
    pub hours_per_day: Option<f64>,
    /// Hours in one estimated working day.
    pub workday_hours: Option<f64>,
    /// Days ahead shown by the agenda and the overview.
    pub agenda_days: Option<u32>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn hours_per_day(&self) -> f64 {
        self.hours_per_day.unwrap_or(DEFAULT_HOURS_PER_DAY)
    }

    pub fn workday_hours(&self) -> f64 {
        self.workday_hours.unwrap_or(DEFAULT_WORKDAY_HOURS)
    }

    pub fn agenda_days(&self) -> u32 {
        self.agenda_days.unwrap_or(DEFAULT_AGENDA_DAYS)
    }

    /// Unknown theme names fall back to plain output.
    pub fn theme(&self) -> Theme {
        self.theme
            .as_deref()
            .and_then(Theme::from_name)
            .unwrap_or_default()
    }

    pub fn palette(&self) -> Palette {
        self.theme().palette()
    }

    /// Applies `RENO_TODAY` on top of the file values.
    pub fn with_env(mut self) -> Self {
        if let Ok(value) = std::env::var(TODAY_ENV_VAR)
            && !value.trim().is_empty()
        {
            self.today = Some(value.trim().to_string());
        }
        self
    }

    /// Returns a copy where every field set in `overrides` wins.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        Self {
            theme: overrides.theme.clone().or_else(|| self.theme.clone()),
            today: overrides.today.clone().or_else(|| self.today.clone()),
            hours_per_day: overrides.hours_per_day.or(self.hours_per_day),
            workday_hours: overrides.workday_hours.or(self.workday_hours),
            agenda_days: overrides.agenda_days.or(self.agenda_days),
            log_level: overrides.log_level.clone().or_else(|| self.log_level.clone()),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let hours = [
            ("hours_per_day", self.hours_per_day),
            ("workday_hours", self.workday_hours),
        ];
        for (key, value) in hours {
            if let Some(value) = value
                && !valid_hours(value)
            {
                return Err(format!("{key} must be between 0 and 24"));
            }
        }
        Ok(())
    }
}

pub fn valid_hours(hours: f64) -> bool {
    hours.is_finite() && hours > 0.0 && hours <= 24.0
}

/// Command-line replacements for individual config keys.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub today: Option<String>,
    pub hours_per_day: Option<f64>,
    pub workday_hours: Option<f64>,
    pub agenda_days: Option<u32>,
    pub log_level: Option<String>,
}

/// Result of reading the config file. A broken file still yields usable
/// defaults; the error is kept so the caller can report it.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

impl ConfigLoad {
    fn from_path(path: &Path) -> Self {
        match read_config(path) {
            Ok(config) => Self {
                config: config.unwrap_or_default(),
                error: None,
            },
            Err(err) => Self {
                config: Config::default(),
                error: Some(err),
            },
        }
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    storage::app_file(CONFIG_ENV_VAR, CONFIG_FILE_NAME)
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => ConfigLoad::from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

/// `Ok(None)` when no config file exists.
fn read_config(path: &Path) -> Result<Option<Config>, AppError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(AppError::io(format!("{}: {err}", path.display()))),
    };

    let config: Config = serde_json::from_str(&content)
        .map_err(|err| AppError::invalid_data(format!("{}: {err}", path.display())))?;
    config
        .validate()
        .map_err(|message| AppError::invalid_data(format!("{}: {message}", path.display())))?;
    Ok(Some(config))
}
