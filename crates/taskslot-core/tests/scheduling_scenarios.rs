//! End-to-end scheduling runs against an in-memory calendar.
//!
//! Working day 09:00-18:00, lunch 12:00-13:00, 15 minute step.

use chrono::{DateTime, FixedOffset, TimeZone};
use taskslot_core::{
    BusyIntervalSet, CalendarWindow, FailureReason, Interval, MemoryCalendar, Priority,
    ScheduleReport, Scheduler, Task, TaskOutcome, WorkCalendarConfig,
};

fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2026, 3, day, hour, minute, 0)
        .unwrap()
}

fn iv(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Interval {
    Interval::new(start, end).unwrap()
}

fn task(name: &str, minutes: u32, priority: Priority, deadline: DateTime<FixedOffset>) -> Task {
    Task::new(name, minutes, deadline, priority).unwrap()
}

fn schedule(tasks: &[Task], now: DateTime<FixedOffset>, busy: Vec<Interval>) -> ScheduleReport {
    let cal = MemoryCalendar::new();
    let mut scheduler = Scheduler::new(WorkCalendarConfig::default(), &cal);
    scheduler.schedule_all(
        tasks,
        CalendarWindow::new(now, at(9, 0, 0)),
        BusyIntervalSet::from(busy),
    )
}

#[test]
fn test_empty_calendar_places_at_work_start() {
    let tasks = vec![task("A", 60, Priority::High, at(3, 8, 0))];
    let report = schedule(&tasks, at(2, 8, 0), vec![]);

    assert_eq!(report.successful.len(), 1);
    assert_eq!(report.successful[0].start, at(2, 9, 0));
    assert_eq!(report.successful[0].end, at(2, 10, 0));
}

#[test]
fn test_busy_block_after_candidate_is_irrelevant() {
    let tasks = vec![task("B", 90, Priority::Medium, at(3, 18, 0))];
    let report = schedule(&tasks, at(2, 9, 0), vec![iv(at(2, 11, 30), at(2, 12, 30))]);

    assert_eq!(report.successful[0].start, at(2, 9, 0));
    assert_eq!(report.successful[0].end, at(2, 10, 30));
}

#[test]
fn test_overlap_pushes_task_past_lunch() {
    let tasks = vec![task("C", 180, Priority::Medium, at(3, 18, 0))];
    let report = schedule(&tasks, at(2, 9, 0), vec![iv(at(2, 11, 30), at(2, 12, 30))]);

    let placed = &report.successful[0];
    assert_eq!(placed.start, at(2, 13, 0));
    assert_eq!(placed.end, at(2, 16, 0));
    assert_eq!(placed.segments.len(), 1);
}

#[test]
fn test_expired_task_fails_without_side_effects() {
    let cal = MemoryCalendar::new();
    let mut scheduler = Scheduler::new(WorkCalendarConfig::default(), &cal);
    let initial = BusyIntervalSet::from(vec![iv(at(2, 14, 0), at(2, 15, 0))]);
    let tasks = vec![task("D", 30, Priority::High, at(1, 12, 0))];

    let report = scheduler.schedule_all(
        &tasks,
        CalendarWindow::new(at(2, 8, 0), at(2, 8, 0)),
        initial.clone(),
    );

    assert!(report.successful.is_empty());
    assert_eq!(report.failed[0].reason, FailureReason::DeadlineExpired);
    assert_eq!(report.outcomes[0].1, TaskOutcome::DeadlinePassed);
    assert_eq!(scheduler.busy(), &initial);
    assert!(cal.created_events().is_empty());
}

#[test]
fn test_equal_priority_processed_by_deadline() {
    let tasks = vec![
        task("d2", 30, Priority::Medium, at(4, 18, 0)),
        task("d1", 30, Priority::Medium, at(3, 18, 0)),
    ];
    let report = schedule(&tasks, at(2, 8, 0), vec![]);

    assert_eq!(report.processing_order(), vec!["d1", "d2"]);
    assert_eq!(report.successful[0].name, "d1");
    assert_eq!(report.successful[0].start, at(2, 9, 0));
    assert_eq!(report.successful[1].start, at(2, 9, 30));
}

#[test]
fn test_full_day_busy_rolls_to_next_morning() {
    let tasks = vec![task("E", 60, Priority::Medium, at(4, 18, 0))];
    let report = schedule(&tasks, at(2, 8, 0), vec![iv(at(2, 9, 0), at(2, 18, 0))]);

    assert_eq!(report.successful[0].start, at(3, 9, 0));
    assert_eq!(report.successful[0].end, at(3, 10, 0));
}

#[test]
fn test_lunch_split_segments() {
    let tasks = vec![task("Split", 120, Priority::High, at(3, 18, 0))];
    let report = schedule(&tasks, at(2, 11, 0), vec![]);

    let placed = &report.successful[0];
    assert_eq!(
        placed.segments,
        vec![iv(at(2, 11, 0), at(2, 12, 0)), iv(at(2, 13, 0), at(2, 14, 0))]
    );
    assert_eq!(placed.start, at(2, 11, 0));
    assert_eq!(placed.end, at(2, 14, 0));
}

#[test]
fn test_no_slot_before_deadline() {
    let tasks = vec![task("Tight", 120, Priority::High, at(2, 10, 0))];
    let report = schedule(&tasks, at(2, 8, 0), vec![]);

    assert!(report.successful.is_empty());
    assert_eq!(report.failed[0].reason, FailureReason::NoSlotFound);
}

#[test]
fn test_one_failure_does_not_stop_the_batch() {
    let tasks = vec![
        task("expired", 30, Priority::High, at(1, 9, 0)),
        task("too-long", 600, Priority::High, at(6, 18, 0)),
        task("fine", 30, Priority::Low, at(6, 18, 0)),
    ];
    let report = schedule(&tasks, at(2, 8, 0), vec![]);

    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.successful.len(), 1);
    assert_eq!(report.successful[0].name, "fine");
    assert_eq!(report.processing_order(), vec!["expired", "too-long", "fine"]);
}

#[test]
fn test_runs_are_deterministic() {
    let tasks = vec![
        task("a", 90, Priority::Low, at(5, 18, 0)),
        task("b", 240, Priority::High, at(4, 18, 0)),
        task("c", 45, Priority::Medium, at(3, 12, 0)),
        task("d", 30, Priority::Medium, at(1, 12, 0)),
    ];
    let busy = vec![iv(at(2, 10, 0), at(2, 11, 15)), iv(at(3, 14, 0), at(3, 16, 0))];

    let first = serde_json::to_string(&schedule(&tasks, at(2, 8, 0), busy.clone())).unwrap();
    let second = serde_json::to_string(&schedule(&tasks, at(2, 8, 0), busy)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_run_reads_json_batch_and_writes_report_shape() {
    let input = r#"[
        {"name": "Write report", "durationMinutes": 60, "deadline": "2026-03-03T18:00:00+00:00", "priority": "High"},
        {"name": "Old chore", "durationMinutes": 30, "deadline": "2026-03-01T18:00:00+00:00", "priority": "low"},
        {"name": "Done", "durationMinutes": 30, "deadline": "2026-03-03T18:00:00+00:00", "priority": "Low", "completed": true}
    ]"#;
    let tasks: Vec<Task> = serde_json::from_str(input).unwrap();

    let cal = MemoryCalendar::new();
    let mut scheduler = Scheduler::new(WorkCalendarConfig::default(), &cal);
    let report = scheduler.run(&tasks, at(2, 8, 0)).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["successful"][0]["name"], "Write report");
    assert_eq!(json["successful"][0]["start"], "2026-03-02T09:00:00+00:00");
    assert_eq!(json["successful"][0]["end"], "2026-03-02T10:00:00+00:00");
    assert_eq!(json["failed"][0]["name"], "Old chore");
    assert_eq!(json["failed"][0]["reason"], "DeadlineExpired");
    assert_eq!(json["failed"].as_array().unwrap().len(), 1);
    assert!(json.get("outcomes").is_none());
    assert_eq!(cal.created_events()[0].title, "Write report");
}

#[test]
fn test_offset_hours_are_local() {
    let taipei = FixedOffset::east_opt(8 * 3600).unwrap();
    let config = WorkCalendarConfig::default().with_offset(taipei);
    let cal = MemoryCalendar::new();
    let mut scheduler = Scheduler::new(config, &cal);

    // 00:30 UTC is 08:30 in Taipei.
    let now = at(2, 0, 30);
    let tasks = vec![task("Standup notes", 30, Priority::High, at(3, 12, 0))];
    let report = scheduler.run(&tasks, now).unwrap();

    let start = report.successful[0].start;
    assert_eq!(start.to_rfc3339(), "2026-03-02T09:00:00+08:00");
}
