use clap::{Parser, Subcommand};
use reno_core::config::{ConfigOverrides, Theme, valid_hours};
use reno_core::model::canonical_key;

#[derive(Parser, Debug)]
#[command(name = "reno", author, version, about = "Track renovation work across the zones of a home", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Reference date used instead of the clock (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", global = true)]
    pub today: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a zone of the apartment
    ///
    /// Example: reno add-zone bathroom "Bathroom"
    AddZone {
        id: String,
        /// Display name, defaults to the id
        name: Option<String>,
    },
    /// Remove a zone and every task in it
    ///
    /// Example: reno remove-zone bathroom
    RemoveZone { id: String },
    /// List zones
    ///
    /// Example: reno zones
    Zones,
    /// Add a task to a zone
    ///
    /// Example: reno add-task kitchen "Replace worktop" --priority high --duration 1.5
    AddTask {
        zone: String,
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Estimated effort in working days
        #[arg(long)]
        duration: Option<f64>,
        /// Explicit task id instead of the generated one
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Edit a task's description, priority or estimate
    ///
    /// Example: reno edit-task T3 --description "Tile splashback" --duration 2
    EditTask {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        duration: Option<f64>,
    },
    /// Delete a task
    ///
    /// Example: reno remove-task T3
    RemoveTask { id: String },
    /// List tasks, optionally for one zone
    ///
    /// Example: reno list kitchen
    /// Example: reno list --status pending --priority high --sort duration-asc
    List {
        zone: Option<String>,
        /// Keep only tasks with this status (repeatable)
        #[arg(long)]
        status: Vec<String>,
        /// Keep only tasks with this priority (repeatable)
        #[arg(long)]
        priority: Vec<String>,
        /// priority, priority-asc, duration or duration-asc
        #[arg(long)]
        sort: Option<String>,
    },
    /// Change a task's status (pending, in-progress, done)
    ///
    /// Example: reno set-status T3 done
    /// Example: reno set-status T3 pending --force
    SetStatus {
        id: String,
        status: String,
        /// Allow moving a task back to an earlier status
        #[arg(long)]
        force: bool,
    },
    /// Schedule a task on a date
    ///
    /// Example: reno schedule T3 2024-05-02
    /// Example: reno schedule T3 2024-05-02 --duration 3
    Schedule {
        id: String,
        date: String,
        /// Replace the effort estimate (working days)
        #[arg(long)]
        duration: Option<f64>,
    },
    /// Remove a task from the calendar
    ///
    /// Example: reno unschedule T3
    Unschedule { id: String },
    /// Show completion per zone and overall
    ///
    /// Example: reno show-progress
    /// Example: reno show-progress kitchen
    ShowProgress { zone: Option<String> },
    /// Show scheduled tasks in a date range
    ///
    /// Example: reno show-agenda
    /// Example: reno show-agenda --from 2024-05-01 --to 2024-05-31
    /// Example: reno show-agenda --week
    ShowAgenda {
        #[arg(long, value_name = "DATE")]
        from: Option<String>,
        #[arg(long, value_name = "DATE")]
        to: Option<String>,
        /// Show the Monday-Sunday week containing --from (or today)
        #[arg(long, conflicts_with = "to")]
        week: bool,
    },
    /// List tasks sharing a date
    ///
    /// Example: reno conflicts 2024-05-02
    Conflicts { date: Option<String> },
    /// Show the full dashboard
    ///
    /// Example: reno overview
    Overview,
    /// Delete every task and restore the default zones
    ///
    /// Example: reno reset --yes
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

impl Command {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::AddZone { .. }
                | Self::RemoveZone { .. }
                | Self::AddTask { .. }
                | Self::EditTask { .. }
                | Self::RemoveTask { .. }
                | Self::SetStatus { .. }
                | Self::Schedule { .. }
                | Self::Unschedule { .. }
                | Self::Reset { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Today,
    HoursPerDay,
    WorkdayHours,
    AgendaDays,
    LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field = canonical_key(key_raw);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "today" => ConfigOverrideTarget::Today,
        "hours_per_day" => ConfigOverrideTarget::HoursPerDay,
        "workday_hours" => ConfigOverrideTarget::WorkdayHours,
        "agenda_days" => ConfigOverrideTarget::AgendaDays,
        "log_level" => ConfigOverrideTarget::LogLevel,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override for '{canonical_field}' needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` argument into one set of overrides.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => {
                let theme = Theme::from_name(&parsed.value)
                    .ok_or_else(|| format!("unknown theme '{}'", parsed.value))?;
                overrides.theme = Some(theme.name().to_string());
            }
            ConfigOverrideTarget::Today => overrides.today = Some(parsed.value),
            ConfigOverrideTarget::HoursPerDay => {
                overrides.hours_per_day = Some(parse_hours("hours_per_day", &parsed.value)?)
            }
            ConfigOverrideTarget::WorkdayHours => {
                overrides.workday_hours = Some(parse_hours("workday_hours", &parsed.value)?)
            }
            ConfigOverrideTarget::AgendaDays => {
                let days = parsed
                    .value
                    .parse::<u32>()
                    .map_err(|_| "agenda_days must be a whole number of days".to_string())?;
                overrides.agenda_days = Some(days);
            }
            ConfigOverrideTarget::LogLevel => overrides.log_level = Some(parsed.value),
        }
    }
    Ok(overrides)
}

fn parse_hours(key: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|hours| valid_hours(*hours))
        .ok_or_else(|| format!("{key} must be between 0 and 24"))
}

#[cfg(test)]
mod tests {
    use super::{ConfigOverrideTarget, collect_config_overrides, parse_config_override};

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" Hours-Per-Day = 4 ").unwrap();

        assert_eq!(parsed.target, ConfigOverrideTarget::HoursPerDay);
        assert_eq!(parsed.value, "4");
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("unknown.field=value").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("themenoir").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn collect_config_overrides_rejects_unknown_theme() {
        let err = collect_config_overrides(&["theme=oceanic".to_string()]).unwrap_err();
        assert!(err.contains("unknown theme"));
    }

    #[test]
    fn parse_config_override_rejects_empty_value() {
        let err = parse_config_override("theme= ").unwrap_err();
        assert!(err.contains("needs a value"));
    }

    #[test]
    fn collect_config_overrides_parses_numbers() {
        let overrides = collect_config_overrides(&[
            "theme=noir".to_string(),
            "agenda_days=7".to_string(),
            "hours_per_day=2.5".to_string(),
        ])
        .unwrap();

        assert_eq!(overrides.theme.as_deref(), Some("noir"));
        assert_eq!(overrides.agenda_days, Some(7));
        assert_eq!(overrides.hours_per_day, Some(2.5));
    }

    #[test]
    fn collect_config_overrides_rejects_bad_hours() {
        let err = collect_config_overrides(&["hours_per_day=0".to_string()]).unwrap_err();
        assert!(err.contains("between 0 and 24"));

        let err = collect_config_overrides(&["agenda_days=soon".to_string()]).unwrap_err();
        assert!(err.contains("whole number"));
    }
}
