//! End-to-end invitation lifecycle over in-memory stores.

use flowday::{
    error::ErrorKind,
    project::{domain::MembershipRole, services::InvitationError},
    task::{domain::Pagination, services::CreateTaskRequest},
};
use rstest::rstest;

use super::helpers::{App, app};

fn token_from(body: &str) -> eyre::Result<String> {
    let (_, rest) = body
        .split_once("token=")
        .ok_or_else(|| eyre::eyre!("invitation body carries no token"))?;
    Ok(rest.chars().take_while(char::is_ascii_hexdigit).collect())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn emailed_token_admits_invitee_to_project_tasks(app: App) -> eyre::Result<()> {
    let owner = app.register("owner@example.com").await?;
    let guest = app.register("guest@example.com").await?;
    let project = app.project(owner, "Orchard").await?;
    app.tasks
        .create_task(owner, CreateTaskRequest::new(project.id(), "Prune trees"))
        .await?;
    app.invitations
        .invite(owner, project.id(), "guest@example.com")
        .await?;

    let pending = app.invitations.list_pending_invitations(guest).await?;
    eyre::ensure!(pending.len() == 1, "guest should see one invitation");

    let tasks = app.tasks.clone();
    let invitations = app.invitations.clone();
    let (notifier, snapshot) = app.drain().await;
    eyre::ensure!(snapshot.delivered == 1, "invitation email not delivered");
    let email = notifier
        .sent_to("guest@example.com")
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("no invitation email"))?;
    let token = token_from(&email.html_body)?;

    invitations.accept_by_token(guest, &token).await?;
    let page = tasks
        .list_project_tasks(guest, project.id(), Pagination::default())
        .await?;
    eyre::ensure!(page.total == 1, "accepted guest should see the task");

    let replay = invitations.accept_by_token(guest, &token).await;
    eyre::ensure!(
        matches!(replay, Err(InvitationError::UnknownToken)),
        "token should be single use, got {replay:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejection_notifies_owner_and_allows_reinvite(app: App) -> eyre::Result<()> {
    let owner = app.register("owner@example.com").await?;
    let guest = app.register("guest@example.com").await?;
    let project = app.project(owner, "Orchard").await?;
    app.invitations
        .invite(owner, project.id(), "guest@example.com")
        .await?;

    app.invitations.reject(guest, project.id()).await?;
    let again = app.invitations.reject(guest, project.id()).await;
    eyre::ensure!(
        again.as_ref().err().map(InvitationError::kind) == Some(ErrorKind::NotFound),
        "second rejection should find nothing, got {again:?}"
    );
    app.invitations
        .invite(owner, project.id(), "guest@example.com")
        .await?;

    let (notifier, snapshot) = app.drain().await;
    eyre::ensure!(snapshot.dropped == 0, "notifications were dropped");
    let notices = notifier.sent_to("owner@example.com");
    eyre::ensure!(notices.len() == 1, "owner should get one rejection notice");
    eyre::ensure!(
        notices
            .first()
            .is_some_and(|notice| notice.html_body.contains("guest@example.com")),
        "notice should name the rejecting user"
    );
    eyre::ensure!(
        notifier.sent_to("guest@example.com").len() == 2,
        "guest should receive both invitations"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removal_revokes_every_view(app: App) -> eyre::Result<()> {
    let owner = app.register("owner@example.com").await?;
    let guest = app.register("guest@example.com").await?;
    let project = app.project(owner, "Orchard").await?;
    app.join(owner, &project, "guest@example.com").await?;
    app.tasks
        .create_task(owner, CreateTaskRequest::new(project.id(), "Harvest"))
        .await?;
    eyre::ensure!(app.tasks.stats(guest).await?.total == 1, "guest sees task");

    let members = app.invitations.list_members(guest, project.id()).await?;
    let roles: Vec<MembershipRole> = members.iter().map(|member| member.role()).collect();
    eyre::ensure!(
        roles == [MembershipRole::Owner, MembershipRole::Member],
        "unexpected member roles {roles:?}"
    );

    eyre::ensure!(
        app.invitations.remove(owner, project.id(), guest).await?,
        "removal should delete the membership"
    );
    eyre::ensure!(app.tasks.stats(guest).await?.total == 0, "guest still sees task");
    eyre::ensure!(
        app.projects.list_projects(guest).await?.is_empty(),
        "guest still lists project"
    );

    let owner_removal = app.invitations.remove(owner, project.id(), owner).await;
    eyre::ensure!(
        matches!(owner_removal, Err(InvitationError::CannotRemoveOwner(_))),
        "owner removal should be refused, got {owner_removal:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_clears_pending_invitations(app: App) -> eyre::Result<()> {
    let owner = app.register("owner@example.com").await?;
    let guest = app.register("guest@example.com").await?;
    let project = app.project(owner, "Short lived").await?;
    app.invitations
        .invite(owner, project.id(), "guest@example.com")
        .await?;

    app.projects.delete_project(owner, project.id()).await?;

    eyre::ensure!(
        app.invitations.list_pending_invitations(guest).await?.is_empty(),
        "invitation outlived its project"
    );
    let accept = app.invitations.accept(guest, project.id()).await;
    eyre::ensure!(accept.is_err(), "accepting a deleted project's invitation succeeded");
    Ok(())
}
