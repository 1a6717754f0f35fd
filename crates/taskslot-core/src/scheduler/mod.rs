//! Batch scheduler.
//!
//! Places tasks one at a time, in priority order, into working-hour slots:
//! - Tasks whose deadline already passed fail without a search
//! - Each remaining task searches from the run's "now" for its earliest
//!   feasible slot
//! - Successful placements are written to the calendar and then reserved in
//!   the busy set, so later tasks see them
//!
//! Placement is greedy: an outcome is never revisited once decided.

pub mod config;
pub mod report;
pub mod slot_finder;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::integrations::CalendarProvider;
use crate::task::{Task, TaskPrioritizer};
use crate::timeline::BusyIntervalSet;

pub use config::{WorkCalendarConfig, WorkDay};
pub use report::{FailedTask, FailureReason, ScheduleReport, ScheduledTask, TaskOutcome};
pub use slot_finder::{PlacementResult, SlotFinder};

/// Time range a run reads busy time for. `start` is the run's "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl CalendarWindow {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    /// From `now` to the latest deadline in `tasks` (or `now` if none is later).
    pub fn for_tasks(now: DateTime<FixedOffset>, tasks: &[Task]) -> Self {
        let end = tasks
            .iter()
            .map(|t| t.deadline)
            .max()
            .filter(|d| *d > now)
            .unwrap_or(now);
        Self::new(now, end)
    }
}

/// Greedy deadline-aware scheduler.
///
/// Owns the busy set for the duration of a run; nothing else mutates it.
pub struct Scheduler<C: CalendarProvider> {
    config: WorkCalendarConfig,
    calendar: C,
    busy: BusyIntervalSet,
}

impl<C: CalendarProvider> Scheduler<C> {
    pub fn new(config: WorkCalendarConfig, calendar: C) -> Self {
        Self {
            config,
            calendar,
            busy: BusyIntervalSet::new(),
        }
    }

    pub fn config(&self) -> &WorkCalendarConfig {
        &self.config
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Busy set as left by the last run.
    pub fn busy(&self) -> &BusyIntervalSet {
        &self.busy
    }

    /// Fetch busy time for the batch and schedule it.
    ///
    /// Completed tasks are dropped first; an empty batch returns an empty
    /// report without contacting the calendar.
    ///
    /// # Errors
    ///
    /// Fails only if the initial busy-interval fetch fails. Per-task failures
    /// are reported in the returned [`ScheduleReport`].
    pub fn run(&mut self, tasks: &[Task], now: DateTime<FixedOffset>) -> Result<ScheduleReport> {
        let pending: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
        if pending.is_empty() {
            info!("no pending tasks to schedule");
            return Ok(ScheduleReport::new());
        }

        let window = CalendarWindow::for_tasks(self.config.localize(now), &pending);
        let fetched = self
            .calendar
            .fetch_busy_intervals(window.start, window.end)?;
        info!(
            calendar = self.calendar.name(),
            busy = fetched.len(),
            tasks = pending.len(),
            "starting scheduling run"
        );

        Ok(self.schedule_all(&pending, window, BusyIntervalSet::from(fetched)))
    }

    /// Schedule `tasks` against `initial_busy`, searching from `window.start`.
    pub fn schedule_all(
        &mut self,
        tasks: &[Task],
        window: CalendarWindow,
        initial_busy: BusyIntervalSet,
    ) -> ScheduleReport {
        let now = self.config.localize(window.start);
        self.busy = initial_busy;
        let mut report = ScheduleReport::new();

        let (expired, live): (Vec<&Task>, Vec<&Task>) =
            tasks.iter().partition(|t| t.is_expired(now));

        for task in expired {
            warn!(task = %task.name, deadline = %task.deadline, "deadline has passed, skipping");
            report.record_failure(FailedTask::new(&task.name, FailureReason::DeadlineExpired));
        }

        for task in TaskPrioritizer::new().order(live) {
            debug!(
                task = %task.name,
                priority = %task.priority,
                deadline = %task.deadline,
                "processing task"
            );
            self.schedule_one(task, now, &mut report);
        }

        info!(
            successful = report.successful.len(),
            failed = report.failed.len(),
            "scheduling run finished"
        );
        report
    }

    fn schedule_one(&mut self, task: &Task, now: DateTime<FixedOffset>, report: &mut ScheduleReport) {
        let placement = match SlotFinder::new(&self.config).find(task, now, &self.busy) {
            PlacementResult::Placed { segments } => {
                ScheduledTask::from_segments(&task.name, segments).ok_or(FailureReason::NoSlotFound)
            }
            PlacementResult::Failed { reason } => Err(reason),
        };
        match placement {
            Ok(scheduled) => self.commit(scheduled, report),
            Err(reason) => {
                warn!(task = %task.name, %reason, "task not scheduled");
                report.record_failure(FailedTask::new(&task.name, reason));
            }
        }
    }

    fn commit(&mut self, scheduled: ScheduledTask, report: &mut ScheduleReport) {
        let total = scheduled.segments.len();
        let mut created = Vec::with_capacity(total);
        let mut errors = Vec::new();

        for (index, segment) in scheduled.segments.iter().enumerate() {
            let title = segment_title(&scheduled.name, index, total);
            match self.calendar.create_event(&title, segment) {
                Ok(()) => {
                    debug!(%title, start = %segment.start(), end = %segment.end(), "event created");
                    created.push(*segment);
                }
                Err(e) => {
                    warn!(%title, error = %e, "failed to create event");
                    errors.push(e.to_string());
                }
            }
        }

        if !errors.is_empty() {
            let mut failure = FailedTask::new(&scheduled.name, FailureReason::CalendarWriteError);
            failure.detail = format!(
                "{} of {} segments created, time not reserved: {}",
                created.len(),
                total,
                errors.join("; ")
            );
            failure.created_segments = created;
            report.record_failure(failure);
            return;
        }

        for segment in &scheduled.segments {
            self.busy.insert(*segment);
        }
        info!(task = %scheduled.name, start = %scheduled.start, end = %scheduled.end, "task scheduled");
        report.record_success(scheduled);
    }
}

/// Event title for segment `index` of `total`.
pub fn segment_title(name: &str, index: usize, total: usize) -> String {
    if total > 1 {
        format!("{} (part {}/{})", name, index + 1, total)
    } else {
        name.to_string()
    }
}
