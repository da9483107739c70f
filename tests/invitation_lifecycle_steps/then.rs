//! Then steps for invitation lifecycle BDD scenarios.

use super::world::{InvitationWorld, run_async};
use flowday::{error::ErrorKind, project::services::InvitationError};
use rstest_bdd_macros::then;

fn can_read(world: &InvitationWorld, email: &str) -> Result<bool, eyre::Report> {
    let user = world.user(email)?;
    let (_, project) = world.owned_project()?;
    Ok(run_async(world.access.can_access_project(user, project))?)
}

#[then(r#""{email}" can read the project"#)]
fn user_can_read(world: &InvitationWorld, email: String) -> Result<(), eyre::Report> {
    eyre::ensure!(can_read(world, &email)?, "{email} should read the project");
    Ok(())
}

#[then(r#""{email}" cannot read the project"#)]
fn user_cannot_read(world: &InvitationWorld, email: String) -> Result<(), eyre::Report> {
    eyre::ensure!(!can_read(world, &email)?, "{email} should not read the project");
    Ok(())
}

#[then(r#""{email}" cannot create tasks"#)]
fn user_cannot_create_tasks(world: &InvitationWorld, email: String) -> Result<(), eyre::Report> {
    let user = world.user(&email)?;
    let (_, project) = world.owned_project()?;
    let allowed = run_async(world.access.can_create_task(user, project))?;
    eyre::ensure!(!allowed, "{email} should not create tasks");
    Ok(())
}

#[then("the last invitation fails with a conflict")]
fn last_invitation_conflicts(world: &InvitationWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_invitation
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing invitation result"))?;
    if !matches!(result, Err(InvitationError::InvitationPending { .. })) {
        return Err(eyre::eyre!("expected InvitationPending error, got {result:?}"));
    }
    Ok(())
}

#[then("the last rejection fails with not found")]
fn last_rejection_not_found(world: &InvitationWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_rejection
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing rejection result"))?;
    match result {
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        other => Err(eyre::eyre!("expected a not-found rejection, got {other:?}")),
    }
}

#[then(r#"the owner can invite "{email}" again"#)]
fn owner_can_invite_again(world: &InvitationWorld, email: String) -> Result<(), eyre::Report> {
    let (owner, project) = world.owned_project()?;
    run_async(world.invitations.invite(owner, project, &email))?;
    Ok(())
}
