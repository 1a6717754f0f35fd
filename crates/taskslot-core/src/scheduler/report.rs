//! Structured result of a scheduling run.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timeline::Interval;

/// Why a task could not be placed.
///
/// Serialized as a stable string (`"DeadlineExpired"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// The deadline was already in the past when the run started
    DeadlineExpired,
    /// No feasible interval exists before the deadline
    NoSlotFound,
    /// The calendar refused one or more segments of a feasible placement
    CalendarWriteError,
}

impl FailureReason {
    /// Default human-readable explanation.
    pub fn message(self) -> &'static str {
        match self {
            FailureReason::DeadlineExpired => "Due date has passed",
            FailureReason::NoSlotFound => "Could not find a suitable time slot",
            FailureReason::CalendarWriteError => "Calendar event could not be created",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::DeadlineExpired => write!(f, "DeadlineExpired"),
            FailureReason::NoSlotFound => write!(f, "NoSlotFound"),
            FailureReason::CalendarWriteError => write!(f, "CalendarWriteError"),
        }
    }
}

/// Terminal state of one task in a run.
///
/// ```text
/// Pending ──> DeadlinePassed
///    └──────> Searching ──> NoSlotFound
///                  └──────> Placed ──> Committed
///                              └─────> PartiallyCommittedError
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    DeadlinePassed,
    NoSlotFound,
    Committed,
    PartiallyCommittedError,
}

/// A task that was placed and written to the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub name: String,
    /// Start of the first segment
    pub start: DateTime<FixedOffset>,
    /// End of the last segment
    pub end: DateTime<FixedOffset>,
    pub segments: Vec<Interval>,
}

impl ScheduledTask {
    /// Build from a non-empty, chronologically ordered segment list.
    pub fn from_segments(name: impl Into<String>, segments: Vec<Interval>) -> Option<Self> {
        let start = segments.first()?.start();
        let end = segments.last()?.end();
        Some(Self {
            name: name.into(),
            start,
            end,
            segments,
        })
    }
}

/// A task that could not be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTask {
    pub name: String,
    pub reason: FailureReason,
    pub detail: String,
    /// Segments that were created before a calendar write failed. They exist
    /// in the external calendar but are not reserved in the busy set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_segments: Vec<Interval>,
}

impl FailedTask {
    pub fn new(name: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            name: name.into(),
            reason,
            detail: reason.message().to_string(),
            created_segments: Vec::new(),
        }
    }
}

/// Result of a batch run: one entry per task, in the order tasks were decided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub successful: Vec<ScheduledTask>,
    pub failed: Vec<FailedTask>,
    /// Processing log, in decision order. Not part of the output schema.
    #[serde(skip)]
    pub outcomes: Vec<(String, TaskOutcome)>,
}

impl ScheduleReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_success(&mut self, task: ScheduledTask) {
        self.outcomes.push((task.name.clone(), TaskOutcome::Committed));
        self.successful.push(task);
    }

    pub(crate) fn record_failure(&mut self, failure: FailedTask) {
        let outcome = match failure.reason {
            FailureReason::DeadlineExpired => TaskOutcome::DeadlinePassed,
            FailureReason::NoSlotFound => TaskOutcome::NoSlotFound,
            FailureReason::CalendarWriteError => TaskOutcome::PartiallyCommittedError,
        };
        self.outcomes.push((failure.name.clone(), outcome));
        self.failed.push(failure);
    }

    /// Names in the order they were decided.
    pub fn processing_order(&self) -> Vec<&str> {
        self.outcomes.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.successful.is_empty() && self.failed.is_empty()
    }
}
