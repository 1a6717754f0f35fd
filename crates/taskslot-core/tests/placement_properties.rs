//! Property tests over randomly generated batches and calendars.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use proptest::prelude::*;
use taskslot_core::{
    BusyIntervalSet, CalendarWindow, Interval, MemoryCalendar, Priority, ScheduleReport,
    Scheduler, Task, WorkCalendarConfig,
};

fn base() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
        .unwrap()
}

fn priority(n: u8) -> Priority {
    match n {
        0 => Priority::High,
        1 => Priority::Medium,
        _ => Priority::Low,
    }
}

#[derive(Debug)]
struct Batch {
    now: DateTime<FixedOffset>,
    busy: Vec<Interval>,
    tasks: Vec<Task>,
}

fn batch_strategy() -> impl Strategy<Value = Batch> {
    let now = 0i64..(24 * 4);
    let busy = prop::collection::vec((0i64..4, 0i64..96, 1i64..17), 0..10);
    let tasks = prop::collection::vec((1u32..40, 0u8..3, -24i64..120), 0..8);

    (now, busy, tasks).prop_map(|(now_quarters, busy, tasks)| {
        let now = base() + Duration::minutes(now_quarters * 15);
        let busy = busy
            .into_iter()
            .map(|(day, quarter, len)| {
                let start = base() + Duration::days(day) + Duration::minutes(quarter * 15);
                Interval::new(start, start + Duration::minutes(len * 15)).unwrap()
            })
            .collect();
        let tasks = tasks
            .into_iter()
            .enumerate()
            .map(|(i, (quarters, p, deadline_hours))| {
                Task::new(
                    format!("t{i}"),
                    quarters * 15,
                    now + Duration::hours(deadline_hours),
                    priority(p),
                )
                .unwrap()
            })
            .collect();
        Batch { now, busy, tasks }
    })
}

fn run(batch: &Batch) -> ScheduleReport {
    let cal = MemoryCalendar::new();
    let mut scheduler = Scheduler::new(WorkCalendarConfig::default(), &cal);
    scheduler.schedule_all(
        &batch.tasks,
        CalendarWindow::new(batch.now, batch.now + Duration::days(6)),
        BusyIntervalSet::from(batch.busy.clone()),
    )
}

proptest! {
    #[test]
    fn placements_have_exact_working_duration(batch in batch_strategy()) {
        let report = run(&batch);
        let by_name: HashMap<&str, &Task> =
            batch.tasks.iter().map(|t| (t.name.as_str(), t)).collect();

        for placed in &report.successful {
            let task = by_name[placed.name.as_str()];
            prop_assert!(placed.start < placed.end);
            prop_assert!(placed.start >= batch.now);
            prop_assert!(placed.end <= task.deadline);
            let minutes: i64 = placed.segments.iter().map(Interval::duration_minutes).sum();
            prop_assert_eq!(minutes, i64::from(task.duration_minutes));
        }
    }

    #[test]
    fn placements_stay_in_working_hours(batch in batch_strategy()) {
        let config = WorkCalendarConfig::default();
        let report = run(&batch);

        for segment in report.successful.iter().flat_map(|p| &p.segments) {
            let day = config.day_of(segment.start());
            prop_assert!(segment.start() >= day.work_start);
            prop_assert!(segment.end() <= day.work_end);
            prop_assert!(!(segment.start() < day.lunch_end && segment.end() > day.lunch_start));
        }
    }

    #[test]
    fn placements_never_overlap_busy_time(batch in batch_strategy()) {
        let report = run(&batch);
        let placed: Vec<(&str, &Interval)> = report
            .successful
            .iter()
            .flat_map(|p| p.segments.iter().map(move |s| (p.name.as_str(), s)))
            .collect();

        for (_, segment) in &placed {
            for busy in &batch.busy {
                prop_assert!(!segment.overlaps(busy));
            }
        }
        for (i, (name_a, a)) in placed.iter().enumerate() {
            for (name_b, b) in &placed[i + 1..] {
                if name_a != name_b {
                    prop_assert!(!a.overlaps(b));
                }
            }
        }
    }

    #[test]
    fn processing_order_follows_priority_then_deadline(batch in batch_strategy()) {
        let report = run(&batch);
        let by_name: HashMap<&str, &Task> =
            batch.tasks.iter().map(|t| (t.name.as_str(), t)).collect();

        let live: Vec<&Task> = report
            .processing_order()
            .into_iter()
            .map(|name| by_name[name])
            .filter(|t| !t.is_expired(batch.now))
            .collect();

        for pair in live.windows(2) {
            let a = (pair[0].priority.rank(), pair[0].deadline);
            let b = (pair[1].priority.rank(), pair[1].deadline);
            prop_assert!(a <= b);
        }
        prop_assert_eq!(report.processing_order().len(), batch.tasks.len());
    }
}
