use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use clap::Subcommand;
use taskslot_core::{
    CalendarProvider, Config, GoogleCalendar, Interval, MemoryCalendar, ScheduleReport, Scheduler,
    Task,
};
use tracing::info;

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Schedule tasks into Google Calendar
    Run {
        /// JSON file with the task batch ("-" reads stdin)
        tasks: PathBuf,
        /// Scheduling start as RFC 3339 (defaults to the current time)
        #[arg(long)]
        now: Option<String>,
        /// Google OAuth access token
        #[arg(long, env = "TASKSLOT_GOOGLE_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// Schedule against busy time from a file without writing anywhere
    Preview {
        /// JSON file with the task batch ("-" reads stdin)
        tasks: PathBuf,
        /// JSON file with busy intervals ([{"start": ..., "end": ...}])
        #[arg(long)]
        busy: Option<PathBuf>,
        /// Scheduling start as RFC 3339 (defaults to the current time)
        #[arg(long)]
        now: Option<String>,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let work = config.work_calendar()?;

    match action {
        ScheduleAction::Run { tasks, now, token } => {
            let token = token.ok_or(
                "no Google access token; pass --token or set TASKSLOT_GOOGLE_TOKEN",
            )?;
            let calendar = GoogleCalendar::new(token)?
                .with_base_url(&config.google.base_url)?
                .with_calendar_id(&config.google.calendar_id)
                .with_offset(work.utc_offset());
            let tasks = read_tasks(&tasks)?;
            let report = execute(Scheduler::new(work, calendar), &tasks, parse_now(now)?)?;
            print_report(&report)?;
        }
        ScheduleAction::Preview { tasks, busy, now } => {
            let busy = match busy {
                Some(path) => read_busy(&path)?,
                None => Vec::new(),
            };
            let tasks = read_tasks(&tasks)?;
            let calendar = MemoryCalendar::new().with_busy(busy);
            let report = execute(Scheduler::new(work, calendar), &tasks, parse_now(now)?)?;
            print_report(&report)?;
        }
    }
    Ok(())
}

fn execute<C: CalendarProvider>(
    mut scheduler: Scheduler<C>,
    tasks: &[Task],
    now: DateTime<FixedOffset>,
) -> Result<ScheduleReport, Box<dyn std::error::Error>> {
    info!(calendar = scheduler.calendar().name(), tasks = tasks.len(), "scheduling batch");
    Ok(scheduler.run(tasks, now)?)
}

fn parse_now(now: Option<String>) -> Result<DateTime<FixedOffset>, Box<dyn std::error::Error>> {
    match now {
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map_err(|e| format!("invalid --now '{s}': {e}").into()),
        None => Ok(Utc::now().fixed_offset()),
    }
}

fn read_input(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()).into())
}

fn read_tasks(path: &Path) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let content = read_input(path)?;
    serde_json::from_str(&content).map_err(|e| format!("{}: {e}", path.display()).into())
}

fn read_busy(path: &Path) -> Result<Vec<Interval>, Box<dyn std::error::Error>> {
    let content = read_input(path)?;
    serde_json::from_str(&content).map_err(|e| format!("{}: {e}", path.display()).into())
}

fn print_report(report: &ScheduleReport) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
