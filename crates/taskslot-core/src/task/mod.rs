//! Task types submitted to a scheduling run.
//!
//! A task is immutable once handed to the scheduler. Its priority is a closed
//! three-value enum whose declaration order is its rank: `High` sorts before
//! `Medium`, which sorts before `Low`.

pub mod prioritizer;

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub use prioritizer::TaskPrioritizer;

/// Task priority.
///
/// Accepts `High`/`Medium`/`Low` in any ASCII case, and `高`/`中`/`低`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Ordinal used as the primary sort key (1 is most urgent).
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "高" => return Ok(Priority::High),
            "中" => return Ok(Priority::Medium),
            "低" => return Ok(Priority::Low),
            _ => {}
        }
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::InvalidValue {
                field: "priority".to_string(),
                message: format!("unknown priority '{other}' (expected High, Medium or Low)"),
            }),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A unit of work to place on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTask")]
pub struct Task {
    /// Display name; not required to be unique
    pub name: String,
    /// Working minutes required, always positive
    pub duration_minutes: u32,
    pub deadline: DateTime<FixedOffset>,
    pub priority: Priority,
    /// Completed tasks are dropped from a batch before scheduling
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    name: String,
    #[serde(alias = "duration_minutes")]
    duration_minutes: u32,
    #[serde(alias = "due_date")]
    deadline: DateTime<FixedOffset>,
    priority: Priority,
    #[serde(default)]
    completed: bool,
}

impl TryFrom<RawTask> for Task {
    type Error = ValidationError;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        let mut task = Task::new(raw.name, raw.duration_minutes, raw.deadline, raw.priority)?;
        task.completed = raw.completed;
        Ok(task)
    }
}

impl Task {
    /// Create a pending task. Zero-length tasks are rejected.
    pub fn new(
        name: impl Into<String>,
        duration_minutes: u32,
        deadline: DateTime<FixedOffset>,
        priority: Priority,
    ) -> Result<Self, ValidationError> {
        if duration_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "durationMinutes".to_string(),
                message: "must be a positive number of minutes".to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            duration_minutes,
            deadline,
            priority,
            completed: false,
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Whether the deadline lies strictly before `now`.
    pub fn is_expired(&self, now: DateTime<FixedOffset>) -> bool {
        self.deadline < now
    }
}
