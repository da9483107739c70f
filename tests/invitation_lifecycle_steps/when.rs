//! When steps for invitation lifecycle BDD scenarios.

use super::world::{InvitationWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

fn invite(world: &mut InvitationWorld, email: &str) -> Result<(), eyre::Report> {
    let (owner, project) = world.owned_project()?;
    world.last_invitation = Some(run_async(world.invitations.invite(owner, project, email)));
    Ok(())
}

#[when(r#"the owner invites "{email}""#)]
fn owner_invites(world: &mut InvitationWorld, email: String) -> Result<(), eyre::Report> {
    invite(world, &email)
}

#[when(r#"the owner invites "{email}" once more"#)]
fn owner_invites_again(world: &mut InvitationWorld, email: String) -> Result<(), eyre::Report> {
    invite(world, &email)
}

#[when(r#""{email}" accepts the invitation"#)]
fn user_accepts(world: &mut InvitationWorld, email: String) -> Result<(), eyre::Report> {
    let user = world.user(&email)?;
    let (_, project) = world.owned_project()?;
    run_async(world.invitations.accept(user, project)).wrap_err("accept invitation")?;
    Ok(())
}

#[when(r#""{email}" rejects the invitation"#)]
fn user_rejects(world: &mut InvitationWorld, email: String) -> Result<(), eyre::Report> {
    let user = world.user(&email)?;
    let (_, project) = world.owned_project()?;
    world.last_rejection = Some(run_async(world.invitations.reject(user, project)));
    Ok(())
}
