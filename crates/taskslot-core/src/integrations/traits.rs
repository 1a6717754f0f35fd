use chrono::{DateTime, FixedOffset};

use crate::error::CalendarError;
use crate::timeline::Interval;

/// The external calendar a scheduling run reads from and writes to.
///
/// Calls are synchronous from the scheduler's point of view; any retry or
/// timeout policy belongs to the implementation.
pub trait CalendarProvider: Send + Sync {
    /// Unique identifier (e.g. "google", "memory").
    fn name(&self) -> &str;

    /// Committed time overlapping `[window_start, window_end)`.
    fn fetch_busy_intervals(
        &self,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<Interval>, CalendarError>;

    /// Create one event covering `interval`.
    fn create_event(&self, title: &str, interval: &Interval) -> Result<(), CalendarError>;
}

impl<T: CalendarProvider + ?Sized> CalendarProvider for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_busy_intervals(
        &self,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<Interval>, CalendarError> {
        (**self).fetch_busy_intervals(window_start, window_end)
    }

    fn create_event(&self, title: &str, interval: &Interval) -> Result<(), CalendarError> {
        (**self).create_event(title, interval)
    }
}

impl<T: CalendarProvider + ?Sized> CalendarProvider for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_busy_intervals(
        &self,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<Interval>, CalendarError> {
        (**self).fetch_busy_intervals(window_start, window_end)
    }

    fn create_event(&self, title: &str, interval: &Interval) -> Result<(), CalendarError> {
        (**self).create_event(title, interval)
    }
}
