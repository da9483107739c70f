//! Domain-focused tests for task values, filters and pagination.

use crate::project::domain::ProjectId;
use crate::task::domain::{
    DueWindow, Pagination, SortDirection, Task, TaskDomainError, TaskFilter, TaskOrder,
    TaskPatch, TaskPriority, TaskStats, TaskStatus, TaskTitle,
};
use crate::test_support::{TestClock, utc};
use chrono::TimeDelta;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> TestClock {
    TestClock::at(2024, 3, 10, 9, 0, 0)
}

fn task(clock: &TestClock, title: &str) -> Task {
    Task::new(
        ProjectId::new(),
        TaskTitle::new(title).expect("valid title"),
        clock,
    )
}

#[rstest]
#[case("todo", TaskStatus::Todo)]
#[case("To Do", TaskStatus::Todo)]
#[case("in_progress", TaskStatus::InProgress)]
#[case("In Progress", TaskStatus::InProgress)]
#[case("in-progress", TaskStatus::InProgress)]
#[case("Done", TaskStatus::Done)]
#[case(" DONE ", TaskStatus::Done)]
fn status_labels_parse_case_insensitively(#[case] raw: &str, #[case] expected: TaskStatus) {
    assert_eq!(TaskStatus::try_from(raw), Ok(expected));
}

#[rstest]
fn unknown_status_is_rejected() {
    assert_eq!(
        "finished".parse::<TaskStatus>(),
        Err(TaskDomainError::UnknownStatus("finished".to_owned()))
    );
}

#[rstest]
#[case("low", TaskPriority::Low)]
#[case("Medium", TaskPriority::Medium)]
#[case("HIGH", TaskPriority::High)]
fn priority_labels_parse(#[case] raw: &str, #[case] expected: TaskPriority) {
    assert_eq!(raw.parse::<TaskPriority>(), Ok(expected));
    assert_eq!(TaskPriority::from_rank(expected.rank()), Ok(expected));
}

#[rstest]
fn priority_rank_outside_range_is_rejected() {
    assert!(TaskPriority::from_rank(7).is_err());
}

#[rstest]
fn titles_are_trimmed_and_bounded() {
    assert_eq!(
        TaskTitle::new("  Write report ").expect("valid title").as_str(),
        "Write report"
    );
    assert_eq!(TaskTitle::new("   "), Err(TaskDomainError::EmptyTitle));
    assert_eq!(
        TaskTitle::new("x".repeat(256)),
        Err(TaskDomainError::TitleTooLong(256))
    );
}

#[rstest]
fn new_tasks_start_as_medium_priority_todo(clock: TestClock) {
    let created = task(&clock, "Draft outline");

    assert_eq!(created.status(), TaskStatus::Todo);
    assert_eq!(created.priority(), TaskPriority::Medium);
    assert_eq!(created.due_date(), None);
    assert_eq!(created.created_at(), utc(2024, 3, 10, 9, 0, 0));
}

#[rstest]
fn patches_only_touch_present_fields(clock: TestClock) {
    let due = utc(2024, 3, 12, 0, 0, 0);
    let mut target = task(&clock, "Draft outline")
        .with_description("first pass")
        .with_due_date(due);

    target.apply(&TaskPatch::default().with_status(TaskStatus::Done));

    assert_eq!(target.status(), TaskStatus::Done);
    assert_eq!(target.priority(), TaskPriority::Medium);
    assert_eq!(target.description(), Some("first pass"));
    assert_eq!(target.due_date(), Some(due));
    assert!(TaskPatch::default().is_empty());
}

#[rstest]
fn absent_and_null_fields_leave_values_in_place(clock: TestClock) {
    let due = utc(2024, 3, 12, 0, 0, 0);
    let mut target = task(&clock, "Draft outline")
        .with_description("first pass")
        .with_due_date(due);
    let patch: TaskPatch =
        serde_json::from_value(serde_json::json!({"description": null, "due_date": null}))
            .expect("nulls deserialize");

    assert!(patch.is_empty());
    target.apply(&patch);

    assert_eq!(target.description(), Some("first pass"));
    assert_eq!(target.due_date(), Some(due));
}

#[rstest]
fn overdue_requires_a_past_due_date_and_open_status(clock: TestClock) {
    let now = utc(2024, 3, 10, 12, 0, 0);
    let past = utc(2024, 3, 9, 0, 0, 0);
    let open = task(&clock, "Open").with_due_date(past);
    let mut finished = task(&clock, "Finished").with_due_date(past);
    finished.apply(&TaskPatch::default().with_status(TaskStatus::Done));
    let undated = task(&clock, "Undated");

    let filter = TaskFilter::overdue_at(now);
    assert!(filter.matches(&open));
    assert!(!filter.matches(&finished));
    assert!(!filter.matches(&undated));
    assert!(open.is_overdue(now));
    assert!(!finished.is_overdue(now));
}

#[rstest]
fn due_windows_are_half_open(clock: TestClock) {
    let window = DueWindow::new(utc(2024, 3, 10, 0, 0, 0), utc(2024, 3, 11, 0, 0, 0));
    let inside = task(&clock, "Inside").with_due_date(utc(2024, 3, 10, 23, 59, 59));
    let at_end = task(&clock, "At end").with_due_date(utc(2024, 3, 11, 0, 0, 0));

    let filter = TaskFilter::due_within(window);
    assert!(filter.matches(&inside));
    assert!(!filter.matches(&at_end));
    assert!(!filter.matches(&task(&clock, "Undated")));
}

#[rstest]
#[case(Some(500), 20)]
#[case(Some(0), 20)]
#[case(Some(-3), 20)]
#[case(None, 20)]
#[case(Some(1), 1)]
#[case(Some(100), 100)]
#[case(Some(101), 20)]
fn out_of_range_limits_fall_back_to_default(#[case] raw: Option<i64>, #[case] expected: u32) {
    assert_eq!(Pagination::from_raw(raw, None, None, None).limit(), expected);
}

#[rstest]
fn pagination_normalizes_offset_order_and_direction() {
    let page = Pagination::from_raw(Some(10), Some(-4), Some("title; DROP"), Some("sideways"));

    assert_eq!(page.offset(), 0);
    assert_eq!(page.order(), TaskOrder::CreatedAt);
    assert_eq!(page.direction(), SortDirection::Desc);

    let explicit = Pagination::from_raw(None, Some(40), Some("Due_Date"), Some("ASC"));
    assert_eq!(explicit.offset(), 40);
    assert_eq!(explicit.order(), TaskOrder::DueDate);
    assert_eq!(explicit.direction(), SortDirection::Asc);
}

#[rstest]
#[case(Some("asc"))]
#[case(Some("desc"))]
fn undated_tasks_sort_last_in_either_direction(clock: TestClock, #[case] direction: Option<&str>) {
    let early = task(&clock, "Early").with_due_date(utc(2024, 3, 1, 0, 0, 0));
    let late = task(&clock, "Late").with_due_date(utc(2024, 3, 20, 0, 0, 0));
    let undated = task(&clock, "Undated");

    let page = Pagination::from_raw(None, None, Some("due_date"), direction);
    let ordered = page.apply(vec![undated, late, early]);

    let titles: Vec<&str> = ordered.iter().map(|item| item.title().as_str()).collect();
    let expected = if direction == Some("asc") {
        vec!["Early", "Late", "Undated"]
    } else {
        vec!["Late", "Early", "Undated"]
    };
    assert_eq!(titles, expected);
}

#[rstest]
fn pages_are_stable_when_sort_keys_tie(clock: TestClock) {
    let tasks: Vec<Task> = (0..5)
        .map(|index| task(&clock, &format!("Task {index}")))
        .collect();
    let first = Pagination::from_raw(Some(2), Some(0), Some("priority"), Some("asc"));
    let second = Pagination::from_raw(Some(2), Some(2), Some("priority"), Some("asc"));

    let page_one = first.apply(tasks.clone());
    let page_two = second.apply(tasks.clone());

    assert_eq!(page_one.len(), 2);
    assert_eq!(page_two.len(), 2);
    assert!(page_one.iter().all(|item| !page_two.contains(item)));
    assert!(page_one[1].id() < page_two[0].id());
}

#[rstest]
fn created_at_ordering_defaults_to_newest_first(clock: TestClock) {
    let older = task(&clock, "Older");
    clock.advance(TimeDelta::minutes(5));
    let newer = task(&clock, "Newer");

    let expected = vec![newer.clone(), older.clone()];

    assert_eq!(Pagination::default().apply(vec![older, newer]), expected);
}

#[rstest]
fn wire_labels_use_snake_case(clock: TestClock) {
    let mut target = task(&clock, "Serialize me").with_priority(TaskPriority::High);
    target.apply(&TaskPatch::default().with_status(TaskStatus::InProgress));

    let value = serde_json::to_value(&target).expect("serializable");

    assert_eq!(value["status"], "in_progress");
    assert_eq!(value["priority"], "high");
    assert_eq!(value["title"], "Serialize me");
}

#[rstest]
fn stats_serialize_as_flat_counts() {
    let stats = TaskStats {
        total: 2,
        done: 0,
        overdue: 1,
        today: 1,
    };

    assert_eq!(
        serde_json::to_value(stats).expect("serializable"),
        serde_json::json!({"total": 2, "done": 0, "overdue": 1, "today": 1})
    );
}
