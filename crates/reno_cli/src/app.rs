//! Executes one parsed command against the store on disk.

use crate::cli::{Cli, Command, collect_config_overrides};
use crate::render;
use clap::error::ErrorKind;
use log::debug;
use reno_core::agenda::{self, format_date, parse_date};
use reno_core::config::{Config, Palette};
use reno_core::error::AppError;
use reno_core::model::{Priority, TaskStatus};
use reno_core::store::{NewTask, TaskEdit};
use reno_core::task_api::{self, TaskFilter, TaskSort};
use serde::Serialize;
use time::{Date, Duration};

/// Settings resolved for one command: config file, `RENO_TODAY`,
/// `--config-override` and `--today`, in increasing priority.
pub struct Context {
    pub config: Config,
    pub today: Date,
    pub palette: Palette,
    pub json: bool,
}

pub fn build_context(cli: &Cli, base: &Config) -> Result<Context, AppError> {
    let overrides =
        collect_config_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let mut config = base.with_overrides(&overrides);
    if let Some(today) = cli.today.as_ref() {
        config.today = Some(today.clone());
    }

    let today = agenda::resolve_today(config.today.as_deref())?;
    let palette = config.palette();
    Ok(Context {
        config,
        today,
        palette,
        json: cli.json,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string(value)
        .map_err(|err| AppError::invalid_data(format!("failed to encode output: {err}")))?;
    println!("{rendered}");
    Ok(())
}

fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>, AppError> {
    raw.map(str::parse::<Priority>).transpose()
}

/// Reduces a clap failure to its first line as an `invalid_input` error.
pub fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Help and version requests surface as clap errors but are not failures.
pub fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

pub fn execute(command: Command, ctx: &Context) -> Result<(), AppError> {
    debug!("event=command module=cli status=start command={command:?}");
    let workday_hours = ctx.config.workday_hours();

    match command {
        Command::AddZone { id, name } => {
            let name = name.unwrap_or_else(|| id.clone());
            let zone = task_api::add_zone(&id, &name)?;
            if ctx.json {
                print_json(&zone)?;
            } else {
                println!("Added zone: {} ({})", zone.name, zone.id);
            }
        }
        Command::RemoveZone { id } => {
            let zone = task_api::remove_zone(&id)?;
            if ctx.json {
                print_json(&zone)?;
            } else {
                println!(
                    "Removed zone: {} ({}) with {} task(s)",
                    zone.name,
                    zone.id,
                    zone.tasks.len()
                );
            }
        }
        Command::Zones => {
            let zones = task_api::list_zones()?;
            if ctx.json {
                print_json(&zones)?;
            } else {
                println!("{}", render::zones_table(&zones));
            }
        }
        Command::AddTask {
            zone,
            description,
            priority,
            duration,
            id,
            status,
        } => {
            let description = description.unwrap_or_default();
            let options = NewTask {
                id,
                priority: parse_priority(priority.as_deref())?.unwrap_or_default(),
                status: status
                    .as_deref()
                    .map(str::parse::<TaskStatus>)
                    .transpose()?
                    .unwrap_or_default(),
                duration_days: duration,
            };

            let task = task_api::add_task(&zone, &description, options)?;
            if ctx.json {
                print_json(&task)?;
            } else {
                println!(
                    "Added task: {} ({}) in {}",
                    task.description, task.id, task.zone_id
                );
            }
        }
        Command::EditTask {
            id,
            description,
            priority,
            duration,
        } => {
            if description.is_none() && priority.is_none() && duration.is_none() {
                return Err(AppError::invalid_input(
                    "nothing to change; pass --description, --priority or --duration",
                ));
            }
            let edit = TaskEdit {
                description,
                priority: parse_priority(priority.as_deref())?,
                duration_days: duration,
            };

            let task = task_api::edit_task(&id, edit)?;
            if ctx.json {
                print_json(&task)?;
            } else {
                println!("Updated task: {} ({})", task.description, task.id);
            }
        }
        Command::RemoveTask { id } => {
            let task = task_api::remove_task(&id)?;
            if ctx.json {
                print_json(&task)?;
            } else {
                println!("Removed task: {} ({})", task.description, task.id);
            }
        }
        Command::List {
            zone,
            status,
            priority,
            sort,
        } => {
            let filter = TaskFilter {
                statuses: status
                    .iter()
                    .map(|raw| raw.parse::<TaskStatus>())
                    .collect::<Result<Vec<_>, _>>()?,
                priorities: priority
                    .iter()
                    .map(|raw| raw.parse::<Priority>())
                    .collect::<Result<Vec<_>, _>>()?,
                sort: sort.as_deref().map(str::parse::<TaskSort>).transpose()?,
            };
            let tasks = task_api::list_tasks(zone.as_deref(), &filter)?;
            if ctx.json {
                print_json(&tasks)?;
            } else {
                println!("{}", render::tasks_table(&tasks, workday_hours));
            }
        }
        Command::SetStatus { id, status, force } => {
            let status = status.parse::<TaskStatus>()?;
            let task = task_api::set_status(&id, status, force)?;
            if ctx.json {
                print_json(&task)?;
            } else {
                println!(
                    "Task {} ({}) is now {}",
                    task.description,
                    task.id,
                    ctx.palette.status(task.status)
                );
            }
        }
        Command::Schedule { id, date, duration } => {
            let task = task_api::schedule_task(&id, &date, duration, ctx.today)?;
            let Some(scheduled_on) = task.scheduled_on else {
                return Err(AppError::invalid_data(format!(
                    "task {} lost its date while scheduling",
                    task.id
                )));
            };

            if ctx.json {
                print_json(&task)?;
            } else {
                println!(
                    "Scheduled task: {} ({}) on {}",
                    task.description,
                    task.id,
                    format_date(scheduled_on)
                );
                let sharing = task_api::conflicts(scheduled_on)?;
                if !sharing.is_empty() {
                    println!(
                        "{}",
                        ctx.palette.dim(&format!(
                            "Note: {} tasks are scheduled on {}",
                            sharing.len(),
                            format_date(scheduled_on)
                        ))
                    );
                }
            }
        }
        Command::Unschedule { id } => {
            let task = task_api::unschedule_task(&id)?;
            if ctx.json {
                print_json(&task)?;
            } else {
                println!("Unscheduled task: {} ({})", task.description, task.id);
            }
        }
        Command::ShowProgress { zone } => {
            let report = task_api::progress_report(zone.as_deref())?;
            if ctx.json {
                print_json(&report)?;
            } else {
                println!("{}", render::progress_text(&report, &ctx.palette));
            }
        }
        Command::ShowAgenda { from, to, week } => {
            let start = from
                .as_deref()
                .map(parse_date)
                .transpose()?
                .unwrap_or(ctx.today);
            let (start, end) = if week {
                agenda::week_of(start)
            } else {
                let end = match to.as_deref() {
                    Some(raw) => parse_date(raw)?,
                    None => start
                        .saturating_add(Duration::days(i64::from(ctx.config.agenda_days()))),
                };
                (start, end)
            };

            let entries = task_api::agenda(start, end)?;
            if ctx.json {
                print_json(&serde_json::json!({
                    "start": format_date(start),
                    "end": format_date(end),
                    "entries": entries,
                }))?;
            } else {
                println!("Agenda {} .. {}", format_date(start), format_date(end));
                println!("{}", render::agenda_table(&entries));
            }
        }
        Command::Conflicts { date } => {
            let date = match date.as_deref() {
                Some(raw) => parse_date(raw)?,
                None => ctx.today,
            };
            let tasks = task_api::conflicts(date)?;
            if ctx.json {
                print_json(&tasks)?;
            } else if tasks.is_empty() {
                println!("No overlapping tasks on {}", format_date(date));
            } else {
                println!("{} tasks share {}:", tasks.len(), format_date(date));
                println!("{}", render::tasks_table(&tasks, workday_hours));
            }
        }
        Command::Overview => {
            let view = task_api::dashboard(ctx.today, &ctx.config)?;
            if ctx.json {
                print_json(&view)?;
            } else {
                println!(
                    "{}",
                    render::dashboard_text(&view, &ctx.palette, workday_hours)
                );
            }
        }
        Command::Reset { yes } => {
            if !yes {
                return Err(AppError::invalid_input(
                    "reset deletes every task; pass --yes to confirm",
                ));
            }
            let store = task_api::reset()?;
            if ctx.json {
                print_json(&store.zones())?;
            } else {
                println!(
                    "Reset project: {} default zone(s), no tasks",
                    store.zones().len()
                );
            }
        }
    }

    Ok(())
}

/// Redraws the one-line summary from a freshly computed dashboard.
pub fn print_footer(ctx: &Context) -> Result<(), AppError> {
    let view = task_api::dashboard(ctx.today, &ctx.config)?;
    println!("{}", render::footer_line(&view, &ctx.palette));
    Ok(())
}
