use reno_core::agenda::{AgendaEntry, format_date};
use reno_core::config::Palette;
use reno_core::dashboard::DashboardView;
use reno_core::model::{Task, Zone};
use reno_core::task_api::ProgressReport;
use std::fmt::Write as _;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const BAR_WIDTH: usize = 20;

#[derive(Tabled)]
struct TaskRow {
    id: String,
    zone: String,
    description: String,
    status: String,
    priority: String,
    scheduled: String,
    effort: String,
}

#[derive(Tabled)]
struct ZoneRow {
    id: String,
    name: String,
    tasks: usize,
}

#[derive(Tabled)]
struct AgendaRow {
    date: String,
    until: String,
    id: String,
    zone: String,
    description: String,
    status: String,
    overlap: String,
}

pub fn format_effort(days: f64, workday_hours: f64) -> String {
    if days >= 1.0 {
        let unit = if days > 1.0 { "days" } else { "day" };
        format!("{days:.1} {unit}")
    } else {
        let hours = days * workday_hours;
        let unit = if hours > 1.0 { "hours" } else { "hour" };
        format!("{hours:.1} {unit}")
    }
}

pub fn progress_bar(percent: f64) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>5.1}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        clamped
    )
}

pub fn tasks_table(tasks: &[Task], workday_hours: f64) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id.clone(),
        zone: task.zone_id.clone(),
        description: task.description.clone(),
        status: task.status.label().to_string(),
        priority: task.priority.label().to_string(),
        scheduled: task
            .scheduled_on
            .map(format_date)
            .unwrap_or_else(|| "-".to_string()),
        effort: task
            .duration_days
            .map(|days| format_effort(days, workday_hours))
            .unwrap_or_else(|| "-".to_string()),
    });
    Table::new(rows).with(Style::psql()).to_string()
}

pub fn zones_table(zones: &[Zone]) -> String {
    if zones.is_empty() {
        return "No zones.".to_string();
    }

    let rows = zones.iter().map(|zone| ZoneRow {
        id: zone.id.clone(),
        name: zone.name.clone(),
        tasks: zone.tasks.len(),
    });
    Table::new(rows).with(Style::psql()).to_string()
}

pub fn progress_text(report: &ProgressReport, palette: &Palette) -> String {
    let mut out = String::new();
    let name_width = report
        .zones
        .iter()
        .map(|zone| zone.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Overall".len());

    for zone in &report.zones {
        let _ = writeln!(
            out,
            "{:<width$}  {}  ({}/{} done)",
            zone.name,
            progress_bar(zone.percent_done),
            zone.counts.done,
            zone.counts.total(),
            width = name_width
        );
    }
    let _ = write!(
        out,
        "{:<width$}  {}",
        "Overall",
        palette.highlight(&progress_bar(report.overall_percent)),
        width = name_width
    );
    out
}

/// Rows starting on a date shared with another task are flagged with `!`.
pub fn agenda_table(entries: &[AgendaEntry]) -> String {
    if entries.is_empty() {
        return "Nothing scheduled.".to_string();
    }

    let shared = |date: time::Date| {
        entries.iter().filter(|entry| entry.date == date).count() > 1
    };

    let rows = entries.iter().map(|entry| AgendaRow {
        date: format_date(entry.date),
        until: if entry.end == entry.date {
            String::new()
        } else {
            format_date(entry.end)
        },
        id: entry.task.id.clone(),
        zone: entry.zone_name.clone(),
        description: entry.task.description.clone(),
        status: entry.task.status.label().to_string(),
        overlap: if shared(entry.date) {
            "!".to_string()
        } else {
            String::new()
        },
    });
    Table::new(rows).with(Style::psql()).to_string()
}

fn task_list(out: &mut String, title: &str, tasks: &[Task], palette: &Palette, empty: &str) {
    let _ = writeln!(out, "{title}");
    if tasks.is_empty() {
        let _ = writeln!(out, "  {}", palette.dim(empty));
    }
    for task in tasks {
        let _ = writeln!(
            out,
            "  {} {} ({}, {})",
            task.id,
            task.description,
            task.zone_id,
            task.priority
        );
    }
    let _ = writeln!(out);
}

/// One-line summary redrawn after every change in the interactive session.
pub fn footer_line(view: &DashboardView, palette: &Palette) -> String {
    let mut line = format!(
        "-- {} done ({}/{}) | today: {} task(s)",
        palette.highlight(&format!("{:.1}%", view.overall_percent)),
        view.counts.done,
        view.counts.total(),
        view.today_tasks.len()
    );
    if !view.conflict_dates.is_empty() {
        let _ = write!(
            line,
            " | {}",
            palette.dim(&format!("{} day(s) with overlaps", view.conflict_dates.len()))
        );
    }
    line
}

pub fn dashboard_text(view: &DashboardView, palette: &Palette, workday_hours: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Renovation overview for {}", format_date(view.today));
    let _ = writeln!(
        out,
        "Tasks: {} total, {} pending, {} in progress, {}",
        view.counts.total(),
        view.counts.pending,
        view.counts.in_progress,
        palette.highlight(&format!("{} done", view.counts.done))
    );
    let _ = writeln!(out);

    let report = ProgressReport {
        overall_percent: view.overall_percent,
        zones: view.zones.clone(),
    };
    let _ = writeln!(out, "{}", progress_text(&report, palette));
    let _ = writeln!(out);

    let _ = writeln!(out, "Today:");
    if view.today_tasks.is_empty() {
        let _ = writeln!(out, "  {}", palette.dim("nothing planned"));
    } else {
        for task in &view.today_tasks {
            let _ = writeln!(
                out,
                "  {} {} [{}]",
                task.id,
                task.description,
                palette.status(task.status)
            );
        }
    }
    let _ = writeln!(out);

    task_list(&mut out, "Priority tasks:", &view.priority_tasks, palette, "none open");
    task_list(
        &mut out,
        "Recommended this week:",
        &view.recommended,
        palette,
        "nothing pending",
    );

    let _ = writeln!(out, "Upcoming:");
    let _ = writeln!(out, "{}", agenda_table(&view.agenda));
    if !view.conflict_dates.is_empty() {
        let dates: Vec<String> = view.conflict_dates.iter().copied().map(format_date).collect();
        let _ = writeln!(out, "Overlapping days: {}", palette.dim(&dates.join(", ")));
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Remaining effort: {}",
        format_effort(view.remaining_effort_days, workday_hours)
    );
    match view.estimated_completion {
        Some(date) => {
            let _ = write!(out, "Estimated completion: {}", format_date(date));
        }
        None => {
            let _ = write!(out, "Estimated completion: {}", palette.highlight("all done"));
        }
    }
    out
}
