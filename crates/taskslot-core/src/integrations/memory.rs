//! In-process calendar.
//!
//! Used for offline previews (busy time loaded from a file, nothing written
//! anywhere) and as the collaborator in tests, where it can be told to reject
//! specific events or to fail the initial fetch.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::traits::CalendarProvider;
use crate::error::CalendarError;
use crate::timeline::Interval;

/// An event accepted by [`MemoryCalendar::create_event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub title: String,
    pub interval: Interval,
}

/// Calendar held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    busy: Vec<Interval>,
    created: Mutex<Vec<CreatedEvent>>,
    rejected_titles: HashSet<String>,
    fail_fetch: bool,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the calendar with existing busy time.
    pub fn with_busy(mut self, busy: impl IntoIterator<Item = Interval>) -> Self {
        self.busy.extend(busy);
        self
    }

    /// Make `create_event` fail for events titled `title`.
    pub fn reject_title(mut self, title: impl Into<String>) -> Self {
        self.rejected_titles.insert(title.into());
        self
    }

    /// Make `fetch_busy_intervals` fail.
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Events accepted so far, in creation order.
    pub fn created_events(&self) -> Vec<CreatedEvent> {
        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CalendarProvider for MemoryCalendar {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_busy_intervals(
        &self,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<Interval>, CalendarError> {
        if self.fail_fetch {
            return Err(CalendarError::Api {
                status: 503,
                message: "memory calendar configured to fail".to_string(),
            });
        }
        Ok(self
            .busy
            .iter()
            .filter(|i| i.start() < window_end && i.end() > window_start)
            .copied()
            .collect())
    }

    fn create_event(&self, title: &str, interval: &Interval) -> Result<(), CalendarError> {
        if self.rejected_titles.contains(title) {
            return Err(CalendarError::WriteRejected {
                title: title.to_string(),
                message: "rejected by memory calendar".to_string(),
            });
        }
        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(CreatedEvent {
                title: title.to_string(),
                interval: *interval,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn iv(a: &str, b: &str) -> Interval {
        Interval::new(at(a), at(b)).unwrap()
    }

    #[test]
    fn fetch_filters_to_window() {
        let cal = MemoryCalendar::new().with_busy(vec![
            iv("2026-03-01T09:00:00+00:00", "2026-03-01T10:00:00+00:00"),
            iv("2026-03-02T09:00:00+00:00", "2026-03-02T10:00:00+00:00"),
            iv("2026-03-05T09:00:00+00:00", "2026-03-05T10:00:00+00:00"),
        ]);
        let busy = cal
            .fetch_busy_intervals(at("2026-03-02T00:00:00+00:00"), at("2026-03-04T00:00:00+00:00"))
            .unwrap();
        assert_eq!(busy.len(), 1);
    }

    #[test]
    fn rejected_titles_are_not_recorded() {
        let cal = MemoryCalendar::new().reject_title("bad");
        let slot = iv("2026-03-02T09:00:00+00:00", "2026-03-02T10:00:00+00:00");
        assert!(cal.create_event("bad", &slot).is_err());
        assert!(cal.create_event("good", &slot).is_ok());
        let created = cal.created_events();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].title, "good");
    }

    #[test]
    fn failing_fetch_errors() {
        let cal = MemoryCalendar::new().failing_fetch();
        assert!(cal
            .fetch_busy_intervals(at("2026-03-02T00:00:00+00:00"), at("2026-03-04T00:00:00+00:00"))
            .is_err());
    }
}
