//! Given steps for invitation lifecycle BDD scenarios.

use super::world::{InvitationWorld, run_async};
use eyre::WrapErr;
use flowday::project::{
    domain::{EmailAddress, User},
    ports::UserDirectory,
};
use rstest_bdd_macros::given;

fn register(world: &mut InvitationWorld, email: &str) -> Result<(), eyre::Report> {
    let user = User::new(EmailAddress::new(email)?);
    run_async(world.users.store(&user)).wrap_err_with(|| format!("register {email}"))?;
    world.registered.insert(email.to_owned(), user.id());
    Ok(())
}

#[given(r#"a project "{name}" owned by "{email}""#)]
fn project_owned_by(
    world: &mut InvitationWorld,
    name: String,
    email: String,
) -> Result<(), eyre::Report> {
    register(world, &email)?;
    let owner = world.user(&email)?;
    let project = run_async(world.projects.create_project(owner, &name))
        .wrap_err("create project for invitation scenario")?;
    world.owner = Some(owner);
    world.project = Some(project.id());
    Ok(())
}

#[given(r#"a registered user "{email}""#)]
fn registered_user(world: &mut InvitationWorld, email: String) -> Result<(), eyre::Report> {
    register(world, &email)
}
