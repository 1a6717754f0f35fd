//! # Taskslot Core Library
//!
//! Places a batch of tasks into free working time on a calendar. Tasks are
//! handled one at a time in priority order; each is given the earliest slot
//! that fits before its deadline, split around lunch if needed, written to
//! the calendar, and then treated as busy for the rest of the batch.
//!
//! ## Architecture
//!
//! - **Timeline**: Half-open intervals and the sorted busy set
//! - **Task**: Task model and the priority/deadline ordering
//! - **Scheduler**: Working-day layout, slot search and the batch driver
//! - **Integrations**: Calendar collaborators (Google Calendar, in-memory)
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Scheduler`]: Runs a batch against a [`CalendarProvider`]
//! - [`SlotFinder`]: Earliest-fit search for a single task
//! - [`ScheduleReport`]: Successful and failed placements
//! - [`Config`]: Application configuration management

pub mod error;
pub mod integrations;
pub mod scheduler;
pub mod storage;
pub mod task;
pub mod timeline;

pub use error::{CalendarError, ConfigError, CoreError, ValidationError};
pub use integrations::{CalendarProvider, CreatedEvent, GoogleCalendar, MemoryCalendar};
pub use scheduler::{
    CalendarWindow, FailedTask, FailureReason, PlacementResult, ScheduleReport, ScheduledTask,
    Scheduler, SlotFinder, TaskOutcome, WorkCalendarConfig,
};
pub use storage::Config;
pub use task::{Priority, Task, TaskPrioritizer};
pub use timeline::{BusyIntervalSet, Interval};
