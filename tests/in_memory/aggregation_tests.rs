//! Calendar, range and statistics views over several projects.

use chrono::{NaiveDate, TimeDelta};
use flowday::{
    config::CalendarConfig,
    error::ErrorKind,
    task::{
        domain::{Pagination, TaskPatch, TaskStatus},
        services::CreateTaskRequest,
    },
};
use rstest::rstest;

use super::helpers::{App, app, at};

fn date(year: i32, month: u32, day: u32) -> eyre::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| eyre::eyre!("invalid date"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn range_spans_owned_and_joined_projects(app: App) -> eyre::Result<()> {
    let alice = app.register("alice@example.com").await?;
    let bob = app.register("bob@example.com").await?;
    let own = app.project(alice, "Own").await?;
    let shared = app.project(bob, "Shared").await?;
    let private = app.project(bob, "Private").await?;
    app.join(bob, &shared, "alice@example.com").await?;

    let seeded = [
        (alice, own.id(), "Own Jan 1", at(2024, 1, 1, 0, 0)),
        (bob, shared.id(), "Shared Jan 31", at(2024, 1, 31, 23, 59)),
        (bob, shared.id(), "Shared Feb 1", at(2024, 2, 1, 0, 0)),
        (bob, private.id(), "Private Jan 15", at(2024, 1, 15, 12, 0)),
    ];
    for (owner, project_id, title, due) in seeded {
        app.tasks
            .create_task(
                owner,
                CreateTaskRequest::new(project_id, title).with_due_date(due),
            )
            .await?;
    }

    let january = app
        .tasks
        .tasks_by_range(alice, date(2024, 1, 1)?, date(2024, 1, 31)?)
        .await?;
    let titles: Vec<&str> = january.iter().map(|task| task.title().as_str()).collect();
    eyre::ensure!(
        titles == ["Own Jan 1", "Shared Jan 31"],
        "unexpected range result {titles:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inverted_range_is_rejected(app: App) -> eyre::Result<()> {
    let alice = app.register("alice@example.com").await?;

    let result = app
        .tasks
        .tasks_by_range(alice, date(2024, 2, 1)?, date(2024, 1, 1)?)
        .await;

    eyre::ensure!(
        result.as_ref().err().map(flowday::task::services::TaskServiceError::kind)
            == Some(ErrorKind::InvalidInput),
        "expected InvalidInput, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stats_follow_status_changes_and_time(app: App) -> eyre::Result<()> {
    let alice = app.register("alice@example.com").await?;
    let project = app.project(alice, "Chores").await?;
    let laundry = app
        .tasks
        .create_task(
            alice,
            CreateTaskRequest::new(project.id(), "Laundry").with_due_date(at(2024, 3, 10, 12, 0)),
        )
        .await?;
    app.tasks
        .create_task(
            alice,
            CreateTaskRequest::new(project.id(), "Taxes").with_due_date(at(2024, 3, 12, 12, 0)),
        )
        .await?;

    let morning = app.tasks.stats(alice).await?;
    eyre::ensure!(
        (morning.total, morning.done, morning.overdue, morning.today) == (2, 0, 0, 1),
        "unexpected morning stats {morning:?}"
    );

    app.clock.advance(TimeDelta::hours(6));
    let afternoon = app.tasks.stats(alice).await?;
    eyre::ensure!(afternoon.overdue == 1, "laundry should be overdue");

    app.tasks
        .update_task(
            alice,
            laundry.id(),
            TaskPatch::default().with_status(TaskStatus::Done),
        )
        .await?;
    let done = app.tasks.stats(alice).await?;
    eyre::ensure!(
        (done.done, done.overdue, done.today) == (1, 0, 1),
        "unexpected stats after completion {done:?}"
    );
    eyre::ensure!(done.done + done.open() == done.total, "stats do not partition");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn calendar_offset_moves_day_boundaries(app: App) -> eyre::Result<()> {
    let alice = app.register("alice@example.com").await?;
    let project = app.project(alice, "Travel").await?;
    app.tasks
        .create_task(
            alice,
            CreateTaskRequest::new(project.id(), "Late flight")
                .with_due_date(at(2024, 3, 10, 23, 30)),
        )
        .await?;
    let east = app
        .tasks
        .clone()
        .with_calendar(CalendarConfig::from_offset_minutes(120)?);

    let utc_day = app.tasks.tasks_by_date(alice, date(2024, 3, 10)?).await?;
    let east_day = east.tasks_by_date(alice, date(2024, 3, 11)?).await?;

    eyre::ensure!(utc_day.len() == 1, "UTC calendar misses the task");
    eyre::ensure!(east_day.len() == 1, "offset calendar misses the task");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_sort_columns_fall_back_to_newest_first(app: App) -> eyre::Result<()> {
    let alice = app.register("alice@example.com").await?;
    let project = app.project(alice, "Sorted").await?;
    for title in ["First", "Second", "Third"] {
        app.tasks
            .create_task(alice, CreateTaskRequest::new(project.id(), title))
            .await?;
        app.clock.advance(TimeDelta::seconds(1));
    }

    let page = app
        .tasks
        .list_project_tasks(
            alice,
            project.id(),
            Pagination::from_raw(Some(500), Some(-1), Some("title"), Some("up")),
        )
        .await?;

    let titles: Vec<&str> = page.tasks.iter().map(|task| task.title().as_str()).collect();
    eyre::ensure!(
        titles == ["Third", "Second", "First"],
        "unexpected order {titles:?}"
    );
    eyre::ensure!(page.pagination.limit() == 20, "limit was not normalized");
    Ok(())
}
