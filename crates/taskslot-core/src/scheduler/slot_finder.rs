//! Earliest-feasible placement search for a single task.
//!
//! The search walks a cursor forward from `search_from` and never moves it
//! back. Each pass either returns a result or advances the cursor strictly:
//! into the working window, past lunch, past a busy member, or to the next
//! working day. Lunch is never counted as working time, so a task that
//! straddles lunch is split into a morning and an afternoon segment whose
//! durations add up to the task's duration.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::{WorkCalendarConfig, WorkDay};
use super::report::FailureReason;
use crate::error::ValidationError;
use crate::task::Task;
use crate::timeline::{BusyIntervalSet, Interval};

/// Outcome of searching for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlacementResult {
    /// One segment, or two when split around lunch, in chronological order.
    Placed { segments: Vec<Interval> },
    Failed { reason: FailureReason },
}

impl PlacementResult {
    fn no_slot() -> Self {
        PlacementResult::Failed {
            reason: FailureReason::NoSlotFound,
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, PlacementResult::Placed { .. })
    }

    /// Placed segments, empty on failure.
    pub fn segments(&self) -> &[Interval] {
        match self {
            PlacementResult::Placed { segments } => segments,
            PlacementResult::Failed { .. } => &[],
        }
    }
}

/// Forward cursor search over working time.
#[derive(Debug, Clone, Copy)]
pub struct SlotFinder<'a> {
    config: &'a WorkCalendarConfig,
}

impl<'a> SlotFinder<'a> {
    pub fn new(config: &'a WorkCalendarConfig) -> Self {
        Self { config }
    }

    /// Find the earliest placement of `task` starting no earlier than
    /// `search_from` and ending no later than the task's deadline.
    pub fn find(
        &self,
        task: &Task,
        search_from: DateTime<FixedOffset>,
        busy: &BusyIntervalSet,
    ) -> PlacementResult {
        let cfg = self.config;
        let duration = task.duration();
        let deadline = cfg.localize(task.deadline);

        if duration > cfg.working_time_per_day() {
            debug!(
                task = %task.name,
                minutes = task.duration_minutes,
                "task is longer than one working day"
            );
            return PlacementResult::no_slot();
        }

        let max_passes = self.max_passes(search_from, deadline, busy);
        let mut t = cfg.localize(search_from);

        for _ in 0..max_passes {
            // Into the working window, rolling to the next day after hours.
            let day = cfg.day_of(t);
            if t < day.work_start {
                t = day.work_start;
            } else if t >= day.work_end {
                t = cfg.next_day_start(t);
            }
            let day = cfg.day_of(t);

            if day.lunch_start <= t && t < day.lunch_end {
                t = day.lunch_end;
            }

            if let Some(member) = busy.containing(t) {
                t = cfg.localize(member.end());
                continue;
            }

            let unadjusted_end = t + duration;
            let straddles_lunch = t < day.lunch_start && unadjusted_end > day.lunch_start;
            let end = if straddles_lunch {
                unadjusted_end + cfg.lunch_length()
            } else {
                unadjusted_end
            };

            // Every later start ends later, so nothing after this can fit.
            if end > deadline {
                debug!(task = %task.name, cursor = %t, "candidate passes deadline");
                return PlacementResult::no_slot();
            }

            if end > day.work_end {
                t = cfg.next_day_start(t);
                continue;
            }

            let segments = match split(t, end, &day, straddles_lunch) {
                Ok(segments) => segments,
                Err(err) => {
                    warn!(task = %task.name, error = %err, "could not build candidate segments");
                    return PlacementResult::no_slot();
                }
            };

            if let Some(member) = segments.iter().find_map(|s| busy.first_overlap(s)) {
                t = cfg.localize(member.end());
                continue;
            }

            return PlacementResult::Placed { segments };
        }

        warn!(
            task = %task.name,
            passes = max_passes,
            "slot search hit its iteration guard"
        );
        PlacementResult::no_slot()
    }

    /// Upper bound on search passes.
    ///
    /// Every pass that does not return moves the cursor past a busy member
    /// or onto a new day, so busy members plus days in range bound the loop.
    /// The day count never exceeds `span / step` because the step is at most
    /// one day.
    fn max_passes(
        &self,
        search_from: DateTime<FixedOffset>,
        deadline: DateTime<FixedOffset>,
        busy: &BusyIntervalSet,
    ) -> usize {
        let span_minutes = (deadline - search_from).num_minutes().max(0);
        let steps = span_minutes / self.config.search_step().num_minutes().max(1);
        usize::try_from(steps).unwrap_or(usize::MAX / 2) + busy.len() + 3
    }
}

fn split(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    day: &WorkDay,
    straddles_lunch: bool,
) -> Result<Vec<Interval>, ValidationError> {
    if straddles_lunch {
        Ok(vec![
            Interval::new(start, day.lunch_start)?,
            Interval::new(day.lunch_end, end)?,
        ])
    } else {
        Ok(vec![Interval::new(start, end)?])
    }
}
