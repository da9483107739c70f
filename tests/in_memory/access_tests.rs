//! Visibility checks: every view answers from the same accessible set.

use chrono::NaiveDate;
use flowday::{
    error::ErrorKind,
    task::{
        domain::{Pagination, TaskStats},
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
async fn pending_invitees_see_nothing_in_any_view(app: App) -> eyre::Result<()> {
    let owner = app.register("owner@example.com").await?;
    let invitee = app.register("invitee@example.com").await?;
    let project = app.project(owner, "Roadmap").await?;
    let task = app
        .tasks
        .create_task(
            owner,
            CreateTaskRequest::new(project.id(), "Plan").with_due_date(at(2024, 3, 10, 15, 0)),
        )
        .await?;
    app.invitations
        .invite(owner, project.id(), "invitee@example.com")
        .await?;

    eyre::ensure!(
        app.projects.list_projects(invitee).await?.is_empty(),
        "pending invitation leaked the project into listings"
    );
    let read = app.tasks.get_task(invitee, task.id()).await;
    eyre::ensure!(
        read.as_ref().err().map(flowday::task::services::TaskServiceError::kind)
            == Some(ErrorKind::NotFound),
        "expected NotFound, got {read:?}"
    );
    let listing = app
        .tasks
        .list_project_tasks(invitee, project.id(), Pagination::default())
        .await;
    eyre::ensure!(listing.is_err(), "listing should be refused");
    eyre::ensure!(
        app.tasks
            .tasks_by_date(invitee, date(2024, 3, 10)?)
            .await?
            .is_empty(),
        "calendar view leaked a task"
    );
    eyre::ensure!(
        app.tasks.stats(invitee).await? == TaskStats::default(),
        "stats counted invisible tasks"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accepted_members_see_the_owner_view(app: App) -> eyre::Result<()> {
    let owner = app.register("owner@example.com").await?;
    let member = app.register("member@example.com").await?;
    let project = app.project(owner, "Roadmap").await?;
    app.join(owner, &project, "member@example.com").await?;
    for (title, due) in [
        ("Today", at(2024, 3, 10, 15, 0)),
        ("Yesterday", at(2024, 3, 9, 15, 0)),
    ] {
        app.tasks
            .create_task(
                owner,
                CreateTaskRequest::new(project.id(), title).with_due_date(due),
            )
            .await?;
    }

    let day = date(2024, 3, 10)?;
    let owner_day = app.tasks.tasks_by_date(owner, day).await?;
    let member_day = app.tasks.tasks_by_date(member, day).await?;
    eyre::ensure!(owner_day == member_day, "calendar views differ");
    eyre::ensure!(owner_day.len() == 1, "expected one task today");

    let owner_stats = app.tasks.stats(owner).await?;
    let member_stats = app.tasks.stats(member).await?;
    eyre::ensure!(owner_stats == member_stats, "stats differ");
    eyre::ensure!(
        owner_stats
            == TaskStats {
                total: 2,
                done: 0,
                overdue: 1,
                today: 1,
            },
        "unexpected stats {owner_stats:?}"
    );

    let page = app
        .tasks
        .list_project_tasks(member, project.id(), Pagination::default())
        .await?;
    eyre::ensure!(page.total == 2, "member listing incomplete");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn projects_stay_isolated_between_owners(app: App) -> eyre::Result<()> {
    let alice = app.register("alice@example.com").await?;
    let bob = app.register("bob@example.com").await?;
    let alices = app.project(alice, "Alice's").await?;
    let bobs = app.project(bob, "Bob's").await?;
    app.tasks
        .create_task(alice, CreateTaskRequest::new(alices.id(), "A"))
        .await?;
    app.tasks
        .create_task(bob, CreateTaskRequest::new(bobs.id(), "B"))
        .await?;

    let cross = app
        .tasks
        .create_task(alice, CreateTaskRequest::new(bobs.id(), "Intrusion"))
        .await;
    eyre::ensure!(
        cross.as_ref().err().map(flowday::task::services::TaskServiceError::kind)
            == Some(ErrorKind::NotFound),
        "cross-tenant create should look like a missing project, got {cross:?}"
    );
    eyre::ensure!(app.tasks.stats(alice).await?.total == 1, "alice sees bob's task");
    eyre::ensure!(app.tasks.stats(bob).await?.total == 1, "bob sees alice's task");
    Ok(())
}
