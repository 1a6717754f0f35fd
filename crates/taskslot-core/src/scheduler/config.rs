//! Working-hours configuration for the scheduler.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

use crate::error::ConfigError;

/// Validated working-day layout.
///
/// Invariant: `work_start < lunch_start < lunch_end < work_end`, all whole
/// hours in `0..=24`, checked once at construction. All day arithmetic
/// happens in `utc_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkCalendarConfig {
    work_start: u32,
    work_end: u32,
    lunch_start: u32,
    lunch_end: u32,
    search_step_minutes: u32,
    utc_offset: FixedOffset,
}

/// The four boundaries of one local working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkDay {
    pub work_start: DateTime<FixedOffset>,
    pub work_end: DateTime<FixedOffset>,
    pub lunch_start: DateTime<FixedOffset>,
    pub lunch_end: DateTime<FixedOffset>,
}

impl WorkCalendarConfig {
    /// Create a config in UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when an hour is above 24, the
    /// hours are not strictly increasing, or the step is outside `1..=1440`.
    pub fn new(
        work_start: u32,
        work_end: u32,
        lunch_start: u32,
        lunch_end: u32,
        search_step_minutes: u32,
    ) -> Result<Self, ConfigError> {
        for (key, hour) in [
            ("work_start", work_start),
            ("work_end", work_end),
            ("lunch_start", lunch_start),
            ("lunch_end", lunch_end),
        ] {
            if hour > 24 {
                return Err(ConfigError::invalid(key, format!("{hour} is not an hour of the day")));
            }
        }
        if !(work_start < lunch_start && lunch_start < lunch_end && lunch_end < work_end) {
            return Err(ConfigError::invalid(
                "work_calendar",
                format!(
                    "expected work_start < lunch_start < lunch_end < work_end, got {work_start} / {lunch_start} / {lunch_end} / {work_end}"
                ),
            ));
        }
        if !(1..=24 * 60).contains(&search_step_minutes) {
            return Err(ConfigError::invalid(
                "search_step_minutes",
                format!("{search_step_minutes} is outside 1..=1440"),
            ));
        }

        Ok(Self {
            work_start,
            work_end,
            lunch_start,
            lunch_end,
            search_step_minutes,
            utc_offset: Utc.fix(),
        })
    }

    /// Use `offset` as the local time of every working day.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn work_start(&self) -> u32 {
        self.work_start
    }

    pub fn work_end(&self) -> u32 {
        self.work_end
    }

    pub fn lunch_start(&self) -> u32 {
        self.lunch_start
    }

    pub fn lunch_end(&self) -> u32 {
        self.lunch_end
    }

    pub fn search_step_minutes(&self) -> u32 {
        self.search_step_minutes
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn search_step(&self) -> Duration {
        Duration::minutes(i64::from(self.search_step_minutes))
    }

    pub fn lunch_length(&self) -> Duration {
        Duration::hours(i64::from(self.lunch_end - self.lunch_start))
    }

    /// Working time available in one day, lunch excluded.
    pub fn working_time_per_day(&self) -> Duration {
        Duration::hours(i64::from(self.work_end - self.work_start)) - self.lunch_length()
    }

    /// Express `t` in the configured offset.
    pub fn localize(&self, t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        t.with_timezone(&self.utc_offset)
    }

    /// Boundaries of the local day `date`.
    pub fn day(&self, date: NaiveDate) -> WorkDay {
        WorkDay {
            work_start: self.at_hour(date, self.work_start),
            work_end: self.at_hour(date, self.work_end),
            lunch_start: self.at_hour(date, self.lunch_start),
            lunch_end: self.at_hour(date, self.lunch_end),
        }
    }

    /// Boundaries of the local day containing `t`.
    pub fn day_of(&self, t: DateTime<FixedOffset>) -> WorkDay {
        self.day(self.localize(t).date_naive())
    }

    /// `work_start` on the local day after the one containing `t`.
    pub fn next_day_start(&self, t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let date = self.localize(t).date_naive();
        let next = date.succ_opt().unwrap_or(date);
        self.at_hour(next, self.work_start)
    }

    fn at_hour(&self, date: NaiveDate, hour: u32) -> DateTime<FixedOffset> {
        let local = date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour));
        let shift = Duration::seconds(i64::from(self.utc_offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(local - shift, self.utc_offset)
    }
}

impl Default for WorkCalendarConfig {
    /// 09:00–18:00 with lunch 12:00–13:00, 15-minute step, UTC.
    fn default() -> Self {
        Self {
            work_start: 9,
            work_end: 18,
            lunch_start: 12,
            lunch_end: 13,
            search_step_minutes: 15,
            utc_offset: Utc.fix(),
        }
    }
}
